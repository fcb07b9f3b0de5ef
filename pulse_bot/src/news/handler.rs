use anyhow::Result;
use chrono::DateTime;
use serenity::all::{Context, CreateEmbed, CreateMessage, Message, Timestamp};

use crate::{coins::handler::EMBED_COLOR, dependencies::BotDependencies, services::dto::NewsPost};

pub const NEWS_LIMIT: usize = 5;
/// Discord rejects embed field names longer than this.
pub const FIELD_NAME_LIMIT: usize = 256;

/// Posts whose title contains `query` (case-insensitive), capped at `limit`.
pub fn filter_news(posts: Vec<NewsPost>, query: Option<&str>, limit: usize) -> Vec<NewsPost> {
    let query = query.map(str::to_lowercase).filter(|q| !q.is_empty());

    posts
        .into_iter()
        .filter(|post| match &query {
            Some(q) => post.title.to_lowercase().contains(q),
            None => true,
        })
        .take(limit)
        .collect()
}

fn format_published(published_at: Option<&str>) -> String {
    published_at
        .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Numbered headline, cut with an ellipsis to fit an embed field name.
pub fn news_field_name(index: usize, title: &str) -> String {
    let name = format!("{}. {}", index + 1, title.trim());
    if name.chars().count() <= FIELD_NAME_LIMIT {
        return name;
    }

    let mut cut: String = name.chars().take(FIELD_NAME_LIMIT - 1).collect();
    cut.push('…');
    cut
}

pub fn news_field_value(post: &NewsPost) -> String {
    let link = post
        .url
        .as_ref()
        .map(|url| format!("🔗 [Read more]({})\n", url))
        .unwrap_or_default();
    format!("{}📅 {}", link, format_published(post.published_at.as_deref()))
}

pub async fn handle_news(
    ctx: &Context,
    msg: &Message,
    query: Option<&str>,
    bot_deps: &BotDependencies,
) -> Result<()> {
    let posts = filter_news(bot_deps.services.news().await?, query, NEWS_LIMIT);

    if posts.is_empty() {
        msg.reply(ctx, "📰 No matching news right now.").await?;
        return Ok(());
    }

    let mut embed = CreateEmbed::new()
        .title("📰 Latest crypto news")
        .colour(EMBED_COLOR)
        .timestamp(Timestamp::now());
    for (index, post) in posts.iter().enumerate() {
        embed = embed.field(
            news_field_name(index, &post.title),
            news_field_value(post),
            false,
        );
    }

    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str) -> NewsPost {
        NewsPost {
            title: title.to_string(),
            url: Some(format!("https://news.test/{}", title.len())),
            published_at: Some("2024-03-01T10:30:00Z".to_string()),
        }
    }

    #[test]
    fn test_filter_by_query_is_case_insensitive() {
        let posts = vec![post("Bitcoin hits ATH"), post("Ethereum upgrade"), post("BITCOIN ETF")];
        let filtered = filter_news(posts, Some("bitcoin"), 5);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[1].title, "BITCOIN ETF");
    }

    #[test]
    fn test_filter_applies_limit() {
        let posts: Vec<NewsPost> = (0..8).map(|i| post(&format!("story {}", i))).collect();

        assert_eq!(filter_news(posts.clone(), None, 5).len(), 5);
        assert_eq!(filter_news(posts, Some(""), 3).len(), 3);
    }

    #[test]
    fn test_long_headlines_are_cut_to_the_field_limit() {
        assert_eq!(news_field_name(0, "Bitcoin hits ATH"), "1. Bitcoin hits ATH");

        let headline = "é".repeat(400);
        let name = news_field_name(4, &headline);
        assert_eq!(name.chars().count(), FIELD_NAME_LIMIT);
        assert!(name.starts_with("5. éé"));
        assert!(name.ends_with('…'));
    }

    #[test]
    fn test_field_value() {
        let value = news_field_value(&post("abc"));
        assert_eq!(value, "🔗 [Read more](https://news.test/3)\n📅 2024-03-01 10:30 UTC");

        let bare = NewsPost {
            title: "x".to_string(),
            url: None,
            published_at: None,
        };
        assert_eq!(news_field_value(&bare), "📅 N/A");
    }
}
