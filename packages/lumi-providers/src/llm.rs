use std::{pin::Pin, time::Duration};

use color_eyre::{Result, eyre};
use futures_util::stream::{Stream, StreamExt};
use reqwest::Client;
use serde_json::Value;

/// Ordered sequence of content deltas from an incremental completion.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Recognized generation knobs. Everything else is fixed by the provider
/// config.
#[derive(Clone, Copy, Debug)]
pub struct GenerationOptions {
	pub max_tokens: u32,
	pub temperature: f32,
}

/// Blocking chat completion. Returns the full response text.
pub async fn complete(
	client: &Client,
	cfg: &lumi_config::LlmProviderConfig,
	messages: &[Value],
	options: GenerationOptions,
) -> Result<String> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"messages": messages,
		"max_tokens": options.max_tokens,
		"temperature": options.temperature,
	});
	let res = client
		.post(url)
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.bearer_auth(&cfg.api_key)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(json)
}

/// Incremental chat completion. Yields content deltas in provider order; the
/// caller must not reorder or buffer them.
pub async fn stream(
	client: &Client,
	cfg: &lumi_config::LlmProviderConfig,
	messages: &[Value],
	options: GenerationOptions,
) -> Result<TextStream> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"messages": messages,
		"max_tokens": options.max_tokens,
		"temperature": options.temperature,
		"stream": true,
	});
	let res = client
		.post(url)
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.bearer_auth(&cfg.api_key)
		.json(&body)
		.send()
		.await?;
	let res = res.error_for_status()?;
	let deltas = stream_lines(res.bytes_stream()).filter_map(|line| async move {
		match line {
			Ok(line) => parse_stream_line(&line),
			Err(err) => Some(Err(err)),
		}
	});

	Ok(Box::pin(deltas))
}

fn parse_completion(json: Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::to_string)
		.ok_or_else(|| eyre::eyre!("Completion response is missing message content."))
}

/// Parses one SSE line. Returns `None` for keep-alives, empty deltas, and the
/// terminal `[DONE]` sentinel.
fn parse_stream_line(line: &str) -> Option<Result<String>> {
	let line = line.trim();
	let data = line.strip_prefix("data:")?.trim();

	if data.is_empty() || data == "[DONE]" {
		return None;
	}

	let json: Value = match serde_json::from_str(data) {
		Ok(json) => json,
		Err(err) => return Some(Err(eyre::eyre!("Failed to parse stream chunk: {err}."))),
	};
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("delta"))
		.and_then(|delta| delta.get("content"))
		.and_then(|c| c.as_str())
		.unwrap_or_default();

	if content.is_empty() {
		return None;
	}

	Some(Ok(content.to_string()))
}

/// Converts a byte stream into a stream of complete lines. Partial lines are
/// buffered until their newline arrives.
fn stream_lines(
	byte_stream: impl Stream<Item = reqwest::Result<bytes::Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String>> + Send {
	futures_util::stream::unfold(
		(Box::pin(byte_stream), String::new()),
		|(mut stream, mut buffer)| async move {
			loop {
				if let Some(newline) = buffer.find('\n') {
					let line = buffer[..newline].to_string();

					buffer = buffer[newline + 1..].to_string();

					if !line.trim().is_empty() {
						return Some((Ok(line), (stream, buffer)));
					}

					continue;
				}

				match stream.next().await {
					Some(Ok(bytes)) => buffer.push_str(&String::from_utf8_lossy(&bytes)),
					Some(Err(err)) =>
						return Some((
							Err(eyre::eyre!("Stream read error: {err}.")),
							(stream, buffer),
						)),
					None => {
						if !buffer.trim().is_empty() {
							let rest = std::mem::take(&mut buffer);

							return Some((Ok(rest), (stream, buffer)));
						}

						return None;
					},
				}
			}
		},
	)
}
