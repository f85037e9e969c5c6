use maud::{html, Markup};

use crate::templates::layouts::{base, PageConfig};

pub fn home_page(api_base: &str) -> Markup {
    let config = PageConfig {
        title: "Hawaii Climate API",
    };

    base(&config, content(api_base))
}

fn content(api_base: &str) -> Markup {
    html! {
        nav class="level" {
            div class="level-left" {
                h1 class="title level-item" {
                    "Hawaii Climate Data API"
                }
            }
            p class="level-item" {
                a href="/docs" class="button is-link is-light is-small" {
                    "API Docs"
                }
            }
        }

        h2 class="subtitle" { "Available API Routes" }
        ul {
            li { a href="/api/v1.0/precipitation" { "/api/v1.0/precipitation" } }
            li { a href="/api/v1.0/stations" { "/api/v1.0/stations" } }
            li { a href="/api/v1.0/tobs" { "/api/v1.0/tobs" } }
            li { "/api/v1.0/<start>" }
            li { "/api/v1.0/<start>/<end>" }
        }

        p {
            strong { "Date format: " }
            "YYYY-MM-DD"
        }
        p class="is-size-7" {
            "All routes are served from "
            a href=(api_base) { (api_base) }
        }
    }
}
