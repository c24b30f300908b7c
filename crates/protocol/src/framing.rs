//! Newline-delimited JSON framing.
//!
//! Every message is a single JSON object followed by `\n`. Lines longer than
//! [`MAX_LINE_LENGTH`] are refused so a misbehaving peer cannot make the
//! reader buffer without bound.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, Result};

/// Maximum accepted line length in bytes, terminator included (64 KiB).
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Serialize `message` as one JSON line and flush it.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut json = serde_json::to_string(message)?;
    json.push('\n');

    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read the next JSON line and deserialize it.
///
/// Returns `Ok(None)` when the peer closed the stream before sending
/// anything.
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    let limit = MAX_LINE_LENGTH as u64;
    let bytes_read = AsyncReadExt::take(&mut *reader, limit)
        .read_line(&mut line)
        .await?;

    if bytes_read == 0 {
        return Ok(None);
    }

    if bytes_read >= MAX_LINE_LENGTH && !line.ends_with('\n') {
        return Err(ProtocolError::FrameTooLarge {
            max: MAX_LINE_LENGTH,
        });
    }

    let message = serde_json::from_str(line.trim())?;
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{BridgeRequest, BridgeResponse};
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_written_message_is_one_line() {
        let mut buffer = Vec::new();
        write_message(&mut buffer, &BridgeRequest::Connect)
            .await
            .unwrap();
        assert_eq!(buffer, b"\"Connect\"\n");
    }

    #[tokio::test]
    async fn test_read_consecutive_messages() {
        let input = b"\"Pong\"\n{\"Error\":{\"message\":\"no client\"}}\n".to_vec();
        let mut reader = BufReader::new(input.as_slice());

        let first: Option<BridgeResponse> = read_message(&mut reader).await.unwrap();
        assert_eq!(first, Some(BridgeResponse::Pong));

        let second: Option<BridgeResponse> = read_message(&mut reader).await.unwrap();
        assert_eq!(second, Some(BridgeResponse::error("no client")));

        let end: Option<BridgeResponse> = read_message(&mut reader).await.unwrap();
        assert_eq!(end, None);
    }

    #[tokio::test]
    async fn test_last_line_without_terminator() {
        let mut reader = BufReader::new(&b"\"Ok\""[..]);
        let message: Option<BridgeResponse> = read_message(&mut reader).await.unwrap();
        assert_eq!(message, Some(BridgeResponse::Ok));
    }

    #[tokio::test]
    async fn test_oversized_line_rejected() {
        let input = vec![b'a'; MAX_LINE_LENGTH + 10];
        let mut reader = BufReader::new(input.as_slice());

        let result: Result<Option<BridgeResponse>> = read_message(&mut reader).await;
        assert!(matches!(result, Err(ProtocolError::FrameTooLarge { .. })));
    }

    /// A JSON string line of exactly `len` bytes, terminator included.
    fn string_line(len: usize) -> Vec<u8> {
        let mut line = vec![b'"'];
        line.extend(std::iter::repeat(b'a').take(len - 3));
        line.extend_from_slice(b"\"\n");
        line
    }

    #[tokio::test]
    async fn test_line_at_limit_accepted() {
        let input = string_line(MAX_LINE_LENGTH);
        let mut reader = BufReader::new(input.as_slice());

        let message: Option<String> = read_message(&mut reader).await.unwrap();
        assert_eq!(message.map(|m| m.len()), Some(MAX_LINE_LENGTH - 3));
    }

    #[tokio::test]
    async fn test_line_one_past_limit_rejected() {
        let input = string_line(MAX_LINE_LENGTH + 1);
        let mut reader = BufReader::new(input.as_slice());

        let result: Result<Option<String>> = read_message(&mut reader).await;
        assert!(matches!(result, Err(ProtocolError::FrameTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_garbage_line_is_deserialization_error() {
        let mut reader = BufReader::new(&b"hello\n"[..]);
        let result: Result<Option<BridgeResponse>> = read_message(&mut reader).await;
        assert!(matches!(result, Err(ProtocolError::Deserialization(_))));
    }
}
