//! Fake bridge and output capture for client tests.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::ExitCode;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::run_in;

/// Accepts one connection, records the request and answers with `reply`.
pub(super) struct FakeBridge {
    port: u16,
    handle: Option<JoinHandle<Result<Vec<u8>>>>,
}

impl FakeBridge {
    pub(super) fn spawn(reply: &str) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").context("bind fake bridge")?;
        let port = listener.local_addr().context("fake bridge address")?.port();
        let reply = reply.as_bytes().to_vec();
        let handle = thread::spawn(move || -> Result<Vec<u8>> {
            let (mut stream, _) = listener.accept().context("accept client")?;
            let mut request = Vec::new();
            stream
                .read_to_end(&mut request)
                .context("read client request")?;
            stream.write_all(&reply).context("write reply")?;
            Ok(request)
        });
        Ok(Self {
            port,
            handle: Some(handle),
        })
    }

    pub(super) fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the exchange and returns the request the client sent.
    pub(super) fn request(mut self) -> Result<Value> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("fake bridge already joined"))?;
        let bytes = handle
            .join()
            .map_err(|_| anyhow!("fake bridge thread panicked"))??;
        serde_json::from_slice(&bytes).context("parse client request")
    }
}

/// Exit status and streams captured from one client run.
pub(super) struct Outcome {
    pub(super) success: bool,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

pub(super) fn invoke(args: &[&str], port: u16, cwd: &Path) -> Outcome {
    let mut argv: Vec<OsString> = vec![
        OsString::from("bridge"),
        OsString::from("--host"),
        OsString::from("127.0.0.1"),
        OsString::from("--port"),
        OsString::from(port.to_string()),
    ];
    argv.extend(args.iter().map(OsString::from));

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run_in(argv, cwd, &mut stdout, &mut stderr);
    Outcome {
        success: code == ExitCode::SUCCESS,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}
