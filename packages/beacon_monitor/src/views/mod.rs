//! Transcript page and per-event block markup.
//!
//! All rendering happens server-side: each event becomes a chat block here,
//! and the embedded browser shim only appends the finished markup and keeps
//! the newest block visible.

mod transcript;

pub use transcript::transcript_page;

use beacon_render::{DisplayIdentity, Side, classify, render_content, side};
use chrono::DateTime;
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

use crate::relay::NormalizedEvent;

/// One rendered frame as shipped over `/transcript/events`.
#[derive(Debug, Serialize)]
pub struct TranscriptFrame {
    pub time: String,
    pub source: String,
    pub side: Side,
    pub icon: &'static str,
    pub label: String,
    pub html: String,
}

pub fn transcript_frame(event: &NormalizedEvent) -> TranscriptFrame {
    let identity = classify(&event.source);
    let side = side(&event.source);
    let html = message_block(event, &identity, side).into_string();
    TranscriptFrame {
        time: event.time.clone(),
        source: event.source.clone(),
        side,
        icon: identity.icon,
        label: identity.label,
        html,
    }
}

/// Chat bubble for one event: meta line (icon, label, timestamp) plus the
/// rendered markdown body. Classification is the caller's; it is computed
/// once per event and reused for both the frame fields and the markup.
pub fn message_block(event: &NormalizedEvent, identity: &DisplayIdentity, side: Side) -> Markup {
    let body = render_content(&event.content);
    html! {
        div class=(format!("msg {}", side.as_str())) {
            div class="meta" {
                span class="actor" {
                    span class="icon" { (identity.icon) }
                    (identity.label)
                }
                " • "
                (format_time(&event.time))
            }
            div class="bubble" { (PreEscaped(body)) }
        }
    }
}

/// Human-readable timestamp; unparseable values pass through unchanged.
fn format_time(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

// Shared CSS constant
pub const CSS: &str = r#"
    * { box-sizing: border-box; }

    body {
        margin: 0;
        height: 100vh;
        display: flex;
        flex-direction: column;
        background: #0a0e1a;
        color: #e5e7eb;
        font-family: -apple-system, 'Segoe UI', Roboto, sans-serif;
    }

    header {
        flex-shrink: 0;
        padding: 12px 20px;
        background: #16213e;
        border-bottom: 1px solid #0f3460;
    }

    header h1 {
        margin: 0 0 4px 0;
        font-size: 18px;
    }

    .topic-line {
        display: flex;
        justify-content: space-between;
        font-size: 13px;
        color: #9ca3af;
    }

    .status.ok { color: #34d399; }
    .status.err { color: #f87171; }

    #chat {
        flex: 1;
        overflow-y: auto;
        padding: 16px 20px;
    }

    .msg {
        max-width: 70%;
        margin-bottom: 14px;
    }

    .msg.left { margin-right: auto; }
    .msg.right { margin-left: auto; text-align: right; }

    .meta {
        font-size: 12px;
        color: #9ca3af;
        margin-bottom: 4px;
    }

    .actor .icon { margin-right: 4px; }

    .bubble {
        display: inline-block;
        text-align: left;
        padding: 10px 14px;
        border-radius: 10px;
        background: #16213e;
        border: 1px solid #0f3460;
        font-size: 14px;
        line-height: 1.45;
        word-break: break-word;
    }

    .msg.right .bubble {
        background: #0f3460;
    }

    .bubble code {
        font-family: 'SF Mono', Monaco, 'Cascadia Code', monospace;
        font-size: 13px;
        background: #0a0e1a;
        padding: 1px 5px;
        border-radius: 4px;
    }

    .bubble pre.code {
        background: #0a0e1a;
        padding: 10px;
        border-radius: 6px;
        overflow-x: auto;
    }

    .bubble h1, .bubble h2, .bubble h3,
    .bubble h4, .bubble h5, .bubble h6 {
        margin: 6px 0 4px 0;
    }

    .bubble ul, .bubble ol {
        margin: 4px 0;
        padding-left: 22px;
    }

    ::-webkit-scrollbar { width: 8px; }
    ::-webkit-scrollbar-track { background: #0a0e1a; }
    ::-webkit-scrollbar-thumb { background: #0f3460; border-radius: 4px; }
"#;

// Browser shim: subscribe, append pre-rendered blocks, keep newest visible.
// Bad frames are dropped (logged to the console) without closing the stream;
// reconnection is EventSource's own behavior.
pub const APP_JS: &str = r#"
    (function(){
        const chat = document.getElementById('chat');
        const status = document.getElementById('status');

        function setStatus(text, ok){
            status.textContent = text;
            status.className = 'status ' + (ok ? 'ok' : 'err');
        }

        if (typeof EventSource === 'undefined') {
            setStatus('SSE unsupported in this browser', false);
            return;
        }

        const es = new EventSource('/transcript/events');
        setStatus('Connecting…', true);

        es.onopen = () => setStatus('Connected', true);
        es.onmessage = (ev) => {
            let frame;
            try {
                frame = JSON.parse(ev.data);
            } catch (e) {
                console.error('bad frame', e);
                return;
            }
            const holder = document.createElement('div');
            holder.innerHTML = frame.html;
            while (holder.firstChild) {
                chat.appendChild(holder.firstChild);
            }
            chat.scrollTop = chat.scrollHeight;
        };
        es.onerror = () => setStatus('Disconnected. Retrying…', false);
    })();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(source: &str, content: serde_json::Value) -> NormalizedEvent {
        NormalizedEvent {
            time: "2026-01-01T12:30:00Z".to_string(),
            source: source.to_string(),
            content,
        }
    }

    fn block(event: &NormalizedEvent) -> String {
        let identity = classify(&event.source);
        let side = side(&event.source);
        message_block(event, &identity, side).into_string()
    }

    #[test]
    fn block_carries_side_class_and_identity() {
        let markup = block(&event("MyAgentX", json!("hi")));
        assert!(markup.contains("msg right"));
        assert!(markup.contains("MyAgentX"));
        assert!(markup.contains("hi"));
    }

    #[test]
    fn block_renders_markdown_content() {
        let markup = block(&event("intent_orchestrator", json!("**done**")));
        assert!(markup.contains("msg left"));
        assert!(markup.contains("IntentOrchestrator"));
        assert!(markup.contains("<strong>done</strong>"));
    }

    #[test]
    fn block_escapes_hostile_content() {
        let markup = block(&event("x", json!("<script>evil()</script>")));
        assert!(!markup.contains("<script>"));
    }

    #[test]
    fn block_uses_the_supplied_classification() {
        // The caller's identity/side are authoritative; the block never
        // re-derives them from the source.
        let identity = DisplayIdentity {
            icon: "❓",
            label: "Custom".to_string(),
        };
        let markup =
            message_block(&event("agent_tasker", json!("ok")), &identity, Side::Left).into_string();
        assert!(markup.contains("msg left"));
        assert!(markup.contains("Custom"));
        assert!(!markup.contains("TaskPlanner"));
    }

    #[test]
    fn frame_exposes_classification_fields() {
        let frame = transcript_frame(&event("agent_tasker", json!("ok")));
        assert_eq!(frame.label, "TaskPlanner");
        assert_eq!(frame.side, Side::Right);
        assert!(frame.html.contains("ok"));

        let encoded = serde_json::to_string(&frame).unwrap();
        assert!(encoded.contains(r#""side":"right""#));
    }

    #[test]
    fn timestamps_format_when_parseable() {
        assert_eq!(format_time("2026-01-01T12:30:00Z"), "2026-01-01 12:30:00");
        assert_eq!(format_time("not a time"), "not a time");
    }
}
