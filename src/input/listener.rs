use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::Sender;
use std::thread;
use std::thread::JoinHandle;
use std::time::Instant;

use log::trace;

/// A line of engine output, stamped with the moment it was read off the pipe.
#[derive(Clone, Debug)]
pub struct ReplyLine {
    pub text: String,
    pub received: Instant,
}

/// Forwards every line of `source` to `reply_tx` until the pipe closes,
/// or until nobody listens anymore.
pub fn listen_to_output<R>(source: R, reply_tx: Sender<ReplyLine>) -> JoinHandle<()>
    where R: Read + Send + 'static {

    thread::spawn(move || {
        let mut reader = BufReader::new(source);

        loop {
            let mut buffer = Vec::new();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) => (),
            }

            let received = Instant::now();
            let text = String::from_utf8_lossy(&buffer).trim_end().to_string();
            trace!("engine > {text}");

            if reply_tx.send(ReplyLine { text, received }).is_err() {
                break;
            }
        }
    })
}
