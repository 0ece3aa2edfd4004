//! Home, listing, and player pages.

use anidex_core::catalog::Episode;
use anidex_core::{AnimeEntry, CoverResolver};
use axum::response::Html;

use super::{asset_href, esc, stream_href, Layout};

/// A catalog entry paired with its resolved cover.
pub struct Card<'a> {
    pub title: &'a str,
    pub entry: &'a AnimeEntry,
    pub cover: String,
}

impl<'a> Card<'a> {
    pub fn resolve(title: &'a str, entry: &'a AnimeEntry, covers: &CoverResolver) -> Self {
        Self {
            title,
            entry,
            cover: covers.resolve(title),
        }
    }

    fn html(&self) -> String {
        let year = self.entry.year_label();
        format!(
            r#"<a class="card" href="{href}" data-name="{name}" data-year="{year}">
<img src="{cover}" alt="{title}" loading="lazy">
<span class="card-title">{title}</span>
<span class="card-year">{year}</span>
</a>"#,
            href = esc(&stream_href(self.title, None)),
            name = esc(&self.title.to_lowercase()),
            year = esc(&year),
            cover = esc(&asset_href(&self.cover)),
            title = esc(self.title),
        )
    }
}

fn grid(cards: &[Card<'_>]) -> String {
    cards.iter().map(Card::html).collect::<Vec<_>>().join("\n")
}

pub fn home(layout: &Layout<'_>, latest: &[Card<'_>]) -> Html<String> {
    let body = format!(
        r#"<section class="hero">
<h1>{site}</h1>
<p>Browse the catalog or request a title we are missing.</p>
</section>
<section>
<h2>Latest additions</h2>
<div class="grid">
{cards}
</div>
<p><a href="/animes">See all animes</a></p>
</section>"#,
        site = esc(layout.site_name()),
        cards = grid(latest),
    );
    layout.render("Home", &body)
}

/// The empty-state notice sits outside the grid and is always present;
/// `search.js` toggles its `hidden` attribute as it filters cards.
pub fn listing(layout: &Layout<'_>, query: &str, results: &[Card<'_>]) -> Html<String> {
    let hidden = if results.is_empty() { "" } else { " hidden" };
    let body = format!(
        r#"<h1>Animes</h1>
<form class="search" method="get" action="/animes">
<input id="search" type="search" name="q" value="{query}" placeholder="Search by title or year" autocomplete="off">
<button type="submit">Search</button>
</form>
<div id="anime-list" class="grid">
{cards}
</div>
<p id="no-results" class="empty"{hidden}>No anime found.</p>
<script src="/static/search.js" defer></script>"#,
        query = esc(query),
        cards = grid(results),
    );
    layout.render("Animes", &body)
}

pub fn stream(
    layout: &Layout<'_>,
    title: &str,
    entry: &AnimeEntry,
    current: &Episode,
    cover: &str,
) -> Html<String> {
    let episodes = entry
        .content
        .iter()
        .map(|ep| {
            let class = if ep.label == current.label { " class=\"current\"" } else { "" };
            format!(
                r#"<li{class}><a href="{}">{}</a></li>"#,
                esc(&stream_href(title, Some(&ep.label))),
                esc(&ep.label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let description = if entry.description.is_empty() {
        String::new()
    } else {
        format!("<p class=\"description\">{}</p>\n", esc(&entry.description))
    };

    let body = format!(
        r#"<article class="stream">
<div class="stream-info">
<img class="cover" src="{cover}" alt="{title}">
<div>
<h1>{title}</h1>
<p class="year">{year}</p>
{description}</div>
</div>
<div class="player">
<h2>Episode {label}</h2>
<iframe src="{embed}" allowfullscreen referrerpolicy="no-referrer"></iframe>
</div>
<ol class="episodes">
{episodes}
</ol>
</article>"#,
        cover = esc(&asset_href(cover)),
        title = esc(title),
        year = esc(&entry.year_label()),
        label = esc(&current.label),
        embed = esc(&current.embed_url),
    );
    layout.render(title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anidex_core::config::SiteConfig;
    use anidex_core::Catalog;

    fn catalog() -> Catalog {
        Catalog::from_slice(
            br#"{"Fate/Zero": {"year": 2011, "description": "<grail>",
                 "content": {"1": "https://player.example/1", "2": "https://player.example/2?a=1&b=2"}}}"#,
        )
        .unwrap()
    }

    #[test]
    fn card_carries_filter_attributes() {
        let catalog = catalog();
        let entry = catalog.get("Fate/Zero").unwrap();
        let card = Card {
            title: "Fate/Zero",
            entry,
            cover: "/static/placeholder.svg".into(),
        };
        let html = card.html();
        assert!(html.contains(r#"data-name="fate/zero""#));
        assert!(html.contains(r#"data-year="2011""#));
        assert!(html.contains(r#"href="/stream/Fate%2FZero""#));
    }

    #[test]
    fn listing_echoes_query_escaped() {
        let site = SiteConfig::default();
        let Html(page) = listing(&Layout::new(&site), "\"><script>", &[]);
        assert!(page.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(page.contains(r#"<p id="no-results" class="empty">No anime found.</p>"#));
    }

    #[test]
    fn listing_with_results_hides_the_empty_notice() {
        let catalog = catalog();
        let entry = catalog.get("Fate/Zero").unwrap();
        let cards = [Card {
            title: "Fate/Zero",
            entry,
            cover: "/static/placeholder.svg".into(),
        }];
        let site = SiteConfig::default();
        let Html(page) = listing(&Layout::new(&site), "", &cards);
        assert!(page.contains(r#"<p id="no-results" class="empty" hidden>No anime found.</p>"#));
        assert!(page.find("id=\"anime-list\"") < page.find("id=\"no-results\""));
    }

    #[test]
    fn search_script_targets_listing_ids() {
        let script = include_str!("../../../../static/search.js");
        let site = SiteConfig::default();
        let Html(page) = listing(&Layout::new(&site), "", &[]);
        for id in ["search", "anime-list", "no-results"] {
            assert!(script.contains(&format!("getElementById(\"{id}\")")), "{id}");
            assert!(page.contains(&format!("id=\"{id}\"")), "{id}");
        }
    }

    #[test]
    fn stream_page_lists_episodes_and_embeds_player() {
        let catalog = catalog();
        let entry = catalog.get("Fate/Zero").unwrap();
        let current = &entry.content[1];
        let site = SiteConfig::default();
        let Html(page) = stream(&Layout::new(&site), "Fate/Zero", entry, current, "/static/placeholder.svg");

        assert!(page.contains(r#"<iframe src="https://player.example/2?a=1&amp;b=2""#));
        assert!(page.contains(r#"href="/stream/Fate%2FZero?ep=1""#));
        assert!(page.contains(r#"<li class="current"><a href="/stream/Fate%2FZero?ep=2">2</a></li>"#));
        assert!(page.contains("&lt;grail&gt;"));
    }
}
