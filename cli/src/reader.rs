use std::io::Result;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

/// One line of input, numbered from 1, line ending stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub number: u64,
    pub text: String,
}

/// Stream a log file line by line into `tx`.
///
/// Without `follow`, stops at end of file. With it, polls every `poll` for
/// appended lines until the receiver is dropped. A partial trailing line is
/// held back until its newline arrives. Returns the number of lines sent.
pub async fn read_log_lines<P: AsRef<Path>>(
    path: P,
    follow: bool,
    poll: Duration,
    tx: mpsc::Sender<LogLine>,
) -> Result<u64> {
    let file = File::open(&path).await?;
    let mut reader = BufReader::new(file);
    let mut idx = 0;
    let mut line = String::new();

    loop {
        let read = reader.read_line(&mut line).await?;
        let complete = line.ends_with('\n');

        if read == 0 || (!complete && follow) {
            if !follow {
                break;
            }
            if tx.is_closed() {
                break;
            }
            // No new data, wait briefly before checking again
            sleep(poll).await;
            continue;
        }

        idx += 1;
        let text = line.trim_end_matches(['\r', '\n']).to_string();
        line.clear();
        if tx.send(LogLine { number: idx, text }).await.is_err() {
            break;
        }
    }

    Ok(idx)
}
