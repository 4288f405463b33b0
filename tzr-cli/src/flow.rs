//! Caller-side protocol flow: initialize, run a command, answer PIN prompts.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use tzr::{DecodedResult, Response, Session, Transport};

/// Sends the first request through `send`, then answers PIN matrix
/// requests with lines read from `pins` until a terminal reply arrives.
pub fn complete<T, P>(
    session: &mut Session<T>,
    pins: &mut P,
    send: impl FnOnce(&mut Session<T>) -> tzr::Result<Response>,
) -> Result<Response>
where
    T: Transport,
    P: FnMut(&str) -> Result<String>,
{
    let mut resp = send(session)?;
    while resp.needs_pin() {
        let pin = pins(&resp.message())?;
        resp = session.pin_matrix_ack(&pin)?;
    }
    Ok(resp)
}

/// Resets the device session; a device `Failure` here aborts the run.
pub fn initialize<T, P>(session: &mut Session<T>, pins: &mut P) -> Result<DecodedResult>
where
    T: Transport,
    P: FnMut(&str) -> Result<String>,
{
    run(session, pins, |s| s.initialize()).context("initialize")
}

/// Completes one command and flattens its terminal reply.
pub fn run<T, P>(
    session: &mut Session<T>,
    pins: &mut P,
    send: impl FnOnce(&mut Session<T>) -> tzr::Result<Response>,
) -> Result<DecodedResult>
where
    T: Transport,
    P: FnMut(&str) -> Result<String>,
{
    finish(&complete(session, pins, send)?)
}

/// Prompts on stderr and reads one PIN line from stdin.
pub fn prompt_pin(prompt: &str) -> Result<String> {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{prompt}")?;
    write!(stderr, "(matrix positions 1-9, as laid out on a keypad) > ")?;
    stderr.flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line).context("read PIN")?;
    if read == 0 {
        bail!("stdin closed while waiting for PIN");
    }
    let pin = line.trim();
    if pin.is_empty() || !pin.bytes().all(|b| (b'1'..=b'9').contains(&b)) {
        bail!("PIN must be matrix positions 1-9");
    }
    Ok(pin.to_owned())
}

/// Fails on a device `Failure`, otherwise flattens the reply.
pub fn finish(resp: &Response) -> Result<DecodedResult> {
    if let Response::Failure(f) = resp {
        bail!(
            "device failure (code {}): {}",
            f.code.unwrap_or_default(),
            f.message.as_deref().unwrap_or("no reason given")
        );
    }
    Ok(resp.into())
}
