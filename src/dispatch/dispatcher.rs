//! Multi-host dispatcher.
//!
//! # Responsibilities
//! - Shuffle the host pool independently for every call
//! - Try hosts strictly one at a time, failing over on transport errors only
//! - Hand the first reply to the shared response processing
//! - Honor per-call cancellation at every await point

use std::future::Future;
use std::time::Instant;

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::AsyncWrite;
use tracing::{Instrument, Span};
use url::Url;

use crate::config::DispatchConfig;
use crate::dispatch::outcome::CallOutcome;
use crate::dispatch::response::{check_status, process_response};
use crate::dispatch::stream::BodyStream;
use crate::dispatch::transport::{self, TransportSettings};
use crate::error::{DispatchError, DispatchResult, TransportFailure};
use crate::observability::metrics;
use crate::pool::{Host, HostPool};
use crate::request::headers::{ensure_request_id, to_header_map};
use crate::request::{CallDescriptor, EncodedBody};

/// Dispatcher operations, used as log and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    GetStream,
    Post,
    PostFormStreamed,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::GetStream => "get_stream",
            Operation::Post => "post",
            Operation::PostFormStreamed => "post_form_streamed",
        }
    }
}

/// Per-call state derived from the descriptor before any host is contacted.
struct PreparedCall {
    headers: HeaderMap,
    query: String,
    request_id: String,
    arguments: Value,
}

/// The first reply of a call, before response processing.
struct Delivery {
    response: Response,
    host: Host,
    attempts: usize,
}

impl Delivery {
    async fn decode<T: DeserializeOwned>(
        self,
        call: &CallDescriptor,
        prepared: &PreparedCall,
    ) -> DispatchResult<T> {
        process_response(self.response, &self.host, call.endpoint(), &prepared.arguments).await
    }

    /// Status-checked live body of the reply.
    async fn into_stream(self, call: &CallDescriptor) -> DispatchResult<BodyStream> {
        let response = check_status(self.response, &self.host, call.endpoint()).await?;
        Ok(BodyStream::new(response, self.host.url().clone(), call.endpoint()))
    }
}

/// Sends calls to a pool of interchangeable hosts with sequential failover.
///
/// Each call tries the hosts of the pool in a freshly shuffled order. A
/// connectivity failure (connect, DNS, timeout) moves on to the next host;
/// any reply ends the iteration, whatever its status.
///
/// ```no_run
/// use multihost_dispatch::{CallDescriptor, Dispatcher, TransportSettings};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Person {
///     name: String,
/// }
///
/// # async fn run() -> Result<(), multihost_dispatch::DispatchError> {
/// let dispatcher = Dispatcher::from_hosts(
///     ["http://10.0.0.1:8080", "http://10.0.0.2:8080"],
///     TransportSettings::default(),
/// )?;
/// let call = CallDescriptor::new("/api/people/1");
/// let person = dispatcher.get::<Person>(&call).await?;
/// println!("{} answered: {}", person.host, person.result.name);
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher {
    pool: HostPool,
    /// Pooled transport shared by GET operations.
    client: Client,
    settings: TransportSettings,
    span: Span,
}

impl Dispatcher {
    /// Create a dispatcher over `pool`.
    pub fn new(pool: HostPool, settings: TransportSettings) -> DispatchResult<Self> {
        let client = transport::shared_client(&settings)?;
        let span = tracing::info_span!("dispatcher", hosts = pool.len());
        Ok(Self {
            pool,
            client,
            settings,
            span,
        })
    }

    /// Parse `hosts` and create a dispatcher. Fails with `Configuration` when empty.
    pub fn from_hosts<I, S>(hosts: I, settings: TransportSettings) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(HostPool::parse(hosts)?, settings)
    }

    /// Dispatcher over a single host.
    pub fn single(host: &str, settings: TransportSettings) -> DispatchResult<Self> {
        Self::new(HostPool::single(Host::parse(host)?), settings)
    }

    pub fn from_config(config: &DispatchConfig) -> DispatchResult<Self> {
        Self::from_hosts(&config.hosts, TransportSettings::from_config(config))
    }

    /// Emit this dispatcher's events under `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn pool(&self) -> &HostPool {
        &self.pool
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// GET `call` and decode the JSON reply into `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        call: &CallDescriptor,
    ) -> DispatchResult<CallOutcome<T>> {
        let prepared = self.prepare(call)?;
        let span = self.call_span(Operation::Get, call, &prepared);

        self.observe(Operation::Get, async {
            let delivery = self
                .send_with_failover(call, &prepared, |url| Ok(self.client.get(url)))
                .await?;
            let (host, attempts) = (delivery.host.clone(), delivery.attempts);
            let result = cancellable(call, delivery.decode(call, &prepared)).await?;
            Ok(outcome(call, &prepared, &host, attempts, result))
        }
        .instrument(span))
        .await
    }

    /// GET `call` and hand back the live body without reading it.
    pub async fn get_stream(
        &self,
        call: &CallDescriptor,
    ) -> DispatchResult<CallOutcome<BodyStream>> {
        let prepared = self.prepare(call)?;
        let span = self.call_span(Operation::GetStream, call, &prepared);

        self.observe(Operation::GetStream, async {
            let delivery = self
                .send_with_failover(call, &prepared, |url| Ok(self.client.get(url)))
                .await?;
            let (host, attempts) = (delivery.host.clone(), delivery.attempts);
            let stream = cancellable(call, delivery.into_stream(call)).await?;
            Ok(outcome(call, &prepared, &host, attempts, stream))
        }
        .instrument(span))
        .await
    }

    /// POST the payload of `call` (JSON, form or multipart) and decode the JSON reply.
    ///
    /// Uses a dedicated transport built for this call only.
    pub async fn post<T: DeserializeOwned>(
        &self,
        call: &CallDescriptor,
    ) -> DispatchResult<CallOutcome<T>> {
        let prepared = self.prepare(call)?;
        let span = self.call_span(Operation::Post, call, &prepared);

        self.observe(Operation::Post, async {
            let body = EncodedBody::encode(call.payload())?;
            tracing::trace!(arguments = %prepared.arguments, "Serialized POST arguments");
            let client = transport::dedicated_client(&self.settings)?;

            let delivery = self
                .send_with_failover(call, &prepared, |url| body.apply(client.post(url)))
                .await?;
            let (host, attempts) = (delivery.host.clone(), delivery.attempts);
            let result = cancellable(call, delivery.decode(call, &prepared)).await?;
            Ok(outcome(call, &prepared, &host, attempts, result))
        }
        .instrument(span))
        .await
    }

    /// POST `call` (typically a multipart body) and copy the reply body into `sink`.
    ///
    /// Nothing is written to `sink` unless the reply is 2xx. The outcome
    /// carries the number of bytes written.
    pub async fn post_form_streamed<W>(
        &self,
        call: &CallDescriptor,
        sink: &mut W,
    ) -> DispatchResult<CallOutcome<u64>>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let prepared = self.prepare(call)?;
        let span = self.call_span(Operation::PostFormStreamed, call, &prepared);

        self.observe(Operation::PostFormStreamed, async {
            let body = EncodedBody::encode(call.payload())?;
            let client = transport::dedicated_client(&self.settings)?;

            let delivery = self
                .send_with_failover(call, &prepared, |url| body.apply(client.post(url)))
                .await?;
            let (host, attempts) = (delivery.host.clone(), delivery.attempts);
            let written = cancellable(call, async {
                delivery.into_stream(call).await?.copy_to(sink).await
            })
            .await?;
            tracing::debug!(bytes = written, "Response body copied to sink");
            Ok(outcome(call, &prepared, &host, attempts, written))
        }
        .instrument(span))
        .await
    }

    fn prepare(&self, call: &CallDescriptor) -> DispatchResult<PreparedCall> {
        if call.cancellation().is_some_and(|token| token.is_cancelled()) {
            return Err(cancelled(call));
        }
        let mut headers = to_header_map(call.extra_headers())?;
        let request_id = ensure_request_id(&mut headers);
        Ok(PreparedCall {
            headers,
            query: call.query_string(),
            request_id,
            arguments: call.arguments(),
        })
    }

    fn call_span(
        &self,
        operation: Operation,
        call: &CallDescriptor,
        prepared: &PreparedCall,
    ) -> Span {
        tracing::info_span!(
            parent: &self.span,
            "call",
            operation = operation.as_str(),
            endpoint = %call.endpoint(),
            request_id = %prepared.request_id,
        )
    }

    async fn observe<T, F>(&self, operation: Operation, call: F) -> DispatchResult<T>
    where
        F: Future<Output = DispatchResult<T>>,
    {
        let start = Instant::now();
        let result = call.await;
        if self.settings.record_metrics {
            let label = match &result {
                Ok(_) => "success",
                Err(e) => e.kind(),
            };
            metrics::record_call(operation.as_str(), label, start);
        }
        result
    }

    /// Try the hosts of a freshly shuffled order until one replies.
    ///
    /// Connectivity failures on leading hosts are logged and skipped; the
    /// final host's failure is the terminal error of the call. Failures that
    /// another host would repeat end the call on the spot.
    async fn send_with_failover<F>(
        &self,
        call: &CallDescriptor,
        prepared: &PreparedCall,
        mut build: F,
    ) -> DispatchResult<Delivery>
    where
        F: FnMut(Url) -> DispatchResult<RequestBuilder>,
    {
        let order = self.pool.shuffled();
        let total = order.len();
        let (leading, last) = order.into_parts();

        for (index, host) in leading.into_iter().enumerate() {
            let attempt = index + 1;
            match self.attempt(call, prepared, &host, attempt, total, &mut build).await? {
                Ok(response) => {
                    return Ok(Delivery {
                        response,
                        host,
                        attempts: attempt,
                    })
                }
                Err(failure) if failure.allows_failover() => {
                    tracing::warn!(
                        host = %host,
                        endpoint = %call.endpoint(),
                        attempt,
                        error = %failure,
                        "Request failed. The request will be retried to a secondary host"
                    );
                    if self.settings.record_metrics {
                        metrics::record_failover(host.url().as_str());
                    }
                }
                Err(failure) => {
                    tracing::error!(
                        host = %host,
                        endpoint = %call.endpoint(),
                        attempt,
                        error = %failure,
                        "Request failed with an error other hosts would repeat"
                    );
                    return Err(DispatchError::Transport {
                        host: host.url().clone(),
                        attempt,
                        of: total,
                        source: failure,
                    });
                }
            }
        }

        match self.attempt(call, prepared, &last, total, total, &mut build).await? {
            Ok(response) => Ok(Delivery {
                response,
                host: last,
                attempts: total,
            }),
            Err(source) => {
                tracing::error!(
                    host = %last,
                    endpoint = %call.endpoint(),
                    attempt = total,
                    error = %source,
                    "Request failed. There are no other alternative hosts to try, \
                     the request failed permanently"
                );
                Err(DispatchError::Transport {
                    host: last.url().clone(),
                    attempt: total,
                    of: total,
                    source,
                })
            }
        }
    }

    /// One attempt against `host`, bounded by the per-host timeout up to the
    /// response headers.
    ///
    /// The outer error aborts the call (invalid request, cancellation); the
    /// inner one is a transport failure.
    async fn attempt<F>(
        &self,
        call: &CallDescriptor,
        prepared: &PreparedCall,
        host: &Host,
        attempt: usize,
        of: usize,
        build: &mut F,
    ) -> DispatchResult<Result<Response, TransportFailure>>
    where
        F: FnMut(Url) -> DispatchResult<RequestBuilder>,
    {
        let url = host.endpoint_url(call.endpoint(), &prepared.query);
        let request = build(url)?.headers(prepared.headers.clone());

        tracing::debug!(host = %host, attempt, of, "Sending request");
        if self.settings.record_metrics {
            metrics::record_attempt(host.url().as_str());
        }

        let limit = self.settings.request_timeout;
        cancellable(call, async {
            Ok(match tokio::time::timeout(limit, request.send()).await {
                Ok(sent) => sent.map_err(TransportFailure::from),
                Err(_) => Err(TransportFailure::TimedOut(limit)),
            })
        })
        .await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("hosts", &self.pool.len())
            .field("timeout", &self.settings.request_timeout)
            .field("accept_invalid_certs", &self.settings.accept_invalid_certs)
            .finish()
    }
}

/// Run `fut` unless the call's cancellation token fires first.
async fn cancellable<T, F>(call: &CallDescriptor, fut: F) -> DispatchResult<T>
where
    F: Future<Output = DispatchResult<T>>,
{
    match call.cancellation() {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!(endpoint = %call.endpoint(), "Call cancelled");
                Err(cancelled(call))
            }
            result = fut => result,
        },
        None => fut.await,
    }
}

fn cancelled(call: &CallDescriptor) -> DispatchError {
    DispatchError::Cancelled {
        endpoint: call.endpoint().to_string(),
    }
}

fn outcome<T>(
    call: &CallDescriptor,
    prepared: &PreparedCall,
    host: &Host,
    attempts: usize,
    result: T,
) -> CallOutcome<T> {
    CallOutcome {
        endpoint: call.endpoint().to_string(),
        arguments: prepared.arguments.clone(),
        host: host.url().clone(),
        attempts,
        request_id: prepared.request_id.clone(),
        result,
    }
}
