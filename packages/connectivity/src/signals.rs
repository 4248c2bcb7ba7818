//! Network signal sources.
//!
//! The console has no browser to hand it `online`/`offline` events, so
//! signals arrive as text lines from a platform monitor (for example
//! `nmcli monitor` piped through a filter, or a test harness). Each line
//! holding `online`, `offline`, `connected`, `disconnected`, `up` or
//! `down` becomes one [`NetworkSignal`]; other lines are skipped.

use futures::Stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};

use crate::NetworkSignal;

/// Turns a line-oriented reader into a stream of network signals.
///
/// The stream ends when the reader reaches EOF or fails.
pub fn line_signals<R>(reader: R) -> impl Stream<Item = NetworkSignal> + Send
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    futures::stream::unfold(reader.lines(), |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let word = line.trim();
                    match word.parse::<NetworkSignal>() {
                        Ok(signal) => return Some((signal, lines)),
                        Err(_) if word.is_empty() => {}
                        Err(_) => log::debug!("Ignoring network monitor line: {word}"),
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    log::warn!("Network monitor read failed: {e}");
                    return None;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use futures::StreamExt as _;

    use super::*;

    #[tokio::test]
    async fn parses_known_words_and_skips_noise() {
        let input: &[u8] = b"online\n\nwlan0: using connection 'home'\nDisconnected\n  up  \n";
        let signals: Vec<NetworkSignal> = line_signals(input).collect().await;

        assert_eq!(
            signals,
            vec![
                NetworkSignal::Online,
                NetworkSignal::Offline,
                NetworkSignal::Online,
            ]
        );
    }
}
