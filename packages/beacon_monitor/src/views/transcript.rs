use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use maud::{DOCTYPE, PreEscaped, html};

use super::{APP_JS, CSS};
use crate::AppState;

pub async fn transcript_page(State(state): State<AppState>) -> impl IntoResponse {
    let markup = html! {
        (DOCTYPE)
        html {
            head {
                title { "Beacon Monitor" }
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                style { (PreEscaped(CSS)) }
            }
            body {
                header {
                    h1 { "📡 Beacon Monitor" }
                    div class="topic-line" {
                        span { "topic: " span id="topic" { (state.config.topic) } }
                        span id="status" class="status" { "Connecting…" }
                    }
                }
                main id="chat" {}
                script { (PreEscaped(APP_JS)) }
            }
        }
    };

    Html(markup.into_string())
}
