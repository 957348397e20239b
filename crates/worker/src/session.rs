//! Request handling over buffered reader/writer pairs.
//!
//! One request per line in, a stream of response lines out, exactly one
//! terminal (`error` or `success`) per request. Every response line is
//! flushed as written so chunks reach the host while the diff is still
//! running.

use std::io::{self, BufRead, Read, Write};

use log::{debug, warn};

use collate_engine::{CancelToken, DiffEngine, EngineError, EngineEvent, WarningKind};
use collate_protocol::{
    error_response, CompareRequest, ProtocolError, WorkerRequest, WorkerResponse,
};

/// Longest accepted request line. Tokenized documents arrive as JSON arrays,
/// so frames run large; anything past this is answered with an uncoded error
/// and skipped.
const MAX_REQUEST_BYTES: usize = if cfg!(test) { 4096 } else { 64 * 1024 * 1024 };

enum Frame {
    Eof,
    Oversized,
    Line(Vec<u8>),
}

/// Serve requests until stdin closes.
///
/// Malformed and oversized lines are answered and skipped; the session keeps
/// going. Write failures abort the session: a host that closed stdout cannot
/// receive a terminal message anyway.
pub fn run<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<()> {
    loop {
        match read_frame(&mut reader)? {
            Frame::Eof => return Ok(()),
            Frame::Oversized => {
                warn!("dropping request line over {MAX_REQUEST_BYTES} bytes");
                let message = ProtocolError::OversizedFrame {
                    limit: MAX_REQUEST_BYTES,
                }
                .to_string();
                write_response(&mut writer, &WorkerResponse::error(message, None))?;
            }
            Frame::Line(raw) => {
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match collate_protocol::decode_request(line) {
                    Ok(WorkerRequest::Compare(request)) => serve_compare(&request, &mut writer)?,
                    Err(err) => {
                        warn!("malformed request line: {err}");
                        write_response(
                            &mut writer,
                            &WorkerResponse::error(err.to_string(), None),
                        )?;
                    }
                }
            }
        }
    }
}

/// Run one comparison, mapping engine events and the terminal outcome onto
/// wire responses. The high-complexity warning goes out only when the request
/// supplied a message for it; the engine reports the condition either way.
fn serve_compare<W: Write>(request: &CompareRequest, writer: &mut W) -> io::Result<()> {
    let messages = &request.warnings;

    let engine = match DiffEngine::new(request.settings.clone()) {
        Ok(engine) => engine,
        Err(err) => return write_response(writer, &error_response(&err, messages)),
    };

    debug!(
        "comparing {} vs {} tokens",
        request.base_tokens.len(),
        request.comparison_tokens.len()
    );

    let outcome = engine.compare(
        &request.base_tokens,
        &request.comparison_tokens,
        &CancelToken::new(),
        |event| {
            let response = match event {
                EngineEvent::Warning(WarningKind::OversizedInput) => {
                    Some(WorkerResponse::warning(messages.too_large()))
                }
                EngineEvent::Warning(WarningKind::HighComplexity) => {
                    messages.complex().map(WorkerResponse::warning)
                }
                EngineEvent::Chunk(tokens) => Some(WorkerResponse::chunk(tokens)),
            };
            if let Some(response) = response {
                write_response(writer, &response)?;
            }
            Ok(())
        },
    );

    match outcome {
        Ok(stats) => write_response(writer, &WorkerResponse::success(&stats)),
        Err(EngineError::Io(err)) => Err(err),
        Err(other) => write_response(writer, &error_response(&other, messages)),
    }
}

/// Read one newline-terminated frame, enforcing the size limit without
/// buffering the oversized remainder.
fn read_frame<R: BufRead>(reader: &mut R) -> io::Result<Frame> {
    let mut raw = Vec::new();
    let limit = MAX_REQUEST_BYTES as u64;
    let n = reader.by_ref().take(limit + 1).read_until(b'\n', &mut raw)?;

    if n == 0 {
        return Ok(Frame::Eof);
    }
    if n > MAX_REQUEST_BYTES {
        if raw.last() != Some(&b'\n') {
            skip_to_newline(reader)?;
        }
        return Ok(Frame::Oversized);
    }
    Ok(Frame::Line(raw))
}

fn skip_to_newline<R: BufRead>(reader: &mut R) -> io::Result<()> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

fn write_response<W: Write>(writer: &mut W, response: &WorkerResponse) -> io::Result<()> {
    let line = collate_protocol::encode_response(response)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}
