//! Newline-delimited JSON codec over the session stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::{RequestEnvelope, ResponseEnvelope};
use crate::error::{ProtocolViolation, SessionError};

/// Read the next request frame. `Ok(None)` means the peer closed the
/// stream cleanly. Blank lines are tolerated; anything else that fails to
/// parse is a protocol violation.
pub async fn read_request<R>(reader: &mut R) -> Result<Option<RequestEnvelope>, SessionError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }
        let frame = line.trim();
        if frame.is_empty() {
            continue;
        }
        return serde_json::from_str(frame)
            .map(Some)
            .map_err(|err| ProtocolViolation::MalformedFrame(err.to_string()).into());
    }
}

/// Write one response frame and flush it.
pub async fn write_response<W>(
    writer: &mut W,
    envelope: &ResponseEnvelope,
) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = serde_json::to_vec(envelope)
        .map_err(|err| ProtocolViolation::MalformedFrame(err.to_string()))?;
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionStatusResponse;
    use crate::protocol::{RequestPayload, ResponsePayload};
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_read_request_frames() {
        let input = concat!(
            r#"{"id":1,"payload":{"type":"stepNames"}}"#,
            "\n\n",
            r#"{"id":2,"payload":{"type":"killProcess"}}"#,
            "\n",
        );
        let mut reader = BufReader::new(input.as_bytes());

        let first = read_request(&mut reader).await.unwrap().unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.payload, RequestPayload::StepNames);

        let second = read_request(&mut reader).await.unwrap().unwrap();
        assert_eq!(second.payload, RequestPayload::KillProcess);

        assert!(read_request(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_frame_is_protocol_violation() {
        let mut reader = BufReader::new("not json\n".as_bytes());
        let err = read_request(&mut reader).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Protocol(ProtocolViolation::MalformedFrame(_))
        ));
    }

    #[tokio::test]
    async fn test_write_response_appends_newline() {
        let mut out: Vec<u8> = Vec::new();
        let envelope = ResponseEnvelope {
            id: 3,
            response: ResponsePayload::status(ExecutionStatusResponse::passed()),
        };
        write_response(&mut out, &envelope).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        let back: ResponseEnvelope = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(back, envelope);
    }
}
