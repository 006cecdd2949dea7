use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::Config;

/// The request reached the endpoint and it answered with a 2xx status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    pub status: u16,
}

#[derive(Debug)]
pub enum SubmitError {
    /// No form URL was configured, so nothing was sent.
    NotConfigured,
    Request(reqwest::Error),
    Status(u16),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "no form URL configured"),
            Self::Request(err) if err.is_timeout() => write!(f, "request timed out"),
            Self::Request(err) if err.is_connect() => write!(f, "could not connect"),
            Self::Request(err) => write!(f, "request failed: {}", err),
            Self::Status(status) => write!(f, "form answered with status {}", status),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err)
    }
}

pub type SubmitOutcome = Result<Delivered, SubmitError>;

/// Sent back to the front end once a spawned submission settles.
#[derive(Debug)]
pub struct SubmitReport {
    pub outcome: SubmitOutcome,
}

/// One form field holding the whole song code.
struct FormPayload<'a> {
    field: &'a str,
    code: &'a str,
}

impl Serialize for FormPayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.field, self.code)?;
        map.end()
    }
}

pub struct FormSubmitter {
    client: reqwest::Client,
    form_url: Option<String>,
    form_field: String,
    sender: mpsc::UnboundedSender<SubmitReport>,
    receiver: mpsc::UnboundedReceiver<SubmitReport>,
    in_flight: usize,
}

impl FormSubmitter {
    pub fn new(config: &Config) -> Result<Self, SubmitError> {
        let mut builder = reqwest::Client::builder().pool_idle_timeout(Duration::from_secs(60));
        if let Some(timeout) = config.submit_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config))
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            client,
            form_url: config.form_url.clone(),
            form_field: config.form_field.clone(),
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Submissions spawned but not yet drained through `poll_reports`.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Spawns a single POST on the current tokio runtime. The outcome
    /// arrives through `poll_reports`/`next_report` whenever the request settles.
    pub fn submit_async(&mut self, code: String) {
        let sender = self.sender.clone();
        let client = self.client.clone();
        let form_url = self.form_url.clone();
        let form_field = self.form_field.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let outcome = Self::submit_static(&client, form_url.as_deref(), &form_field, &code).await;
            let _ = sender.send(SubmitReport { outcome });
        });
    }

    /// Collects every report that has arrived since the last call.
    pub fn poll_reports(&mut self) -> Vec<SubmitReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.receiver.try_recv() {
            reports.push(report);
        }
        self.settle(reports.len());
        reports
    }

    /// Waits for the next report. Returns `None` when nothing is in flight.
    pub async fn next_report(&mut self) -> Option<SubmitReport> {
        if self.in_flight == 0 {
            return None;
        }
        let report = self.receiver.recv().await;
        if report.is_some() {
            self.settle(1);
        }
        report
    }

    fn settle(&mut self, count: usize) {
        self.in_flight = self.in_flight.saturating_sub(count);
    }

    pub async fn submit_static(
        client: &reqwest::Client,
        form_url: Option<&str>,
        form_field: &str,
        code: &str,
    ) -> SubmitOutcome {
        let outcome = Self::post_form(client, form_url, form_field, code).await;
        match &outcome {
            Ok(delivered) => tracing::info!(status = delivered.status, bytes = code.len(), "song code submitted"),
            Err(err) => tracing::warn!(error = %err, "error submitting song code"),
        }
        outcome
    }

    async fn post_form(
        client: &reqwest::Client,
        form_url: Option<&str>,
        form_field: &str,
        code: &str,
    ) -> SubmitOutcome {
        let url = form_url.ok_or(SubmitError::NotConfigured)?;
        let payload = FormPayload {
            field: form_field,
            code,
        };

        let response = client.post(url).form(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status(status.as_u16()));
        }
        Ok(Delivered {
            status: status.as_u16(),
        })
    }
}
