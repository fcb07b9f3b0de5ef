//! Utility functions for pulse_bot.

use anyhow::Result;
use serenity::all::{ChannelId, Context};

pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Split a message into chunks that fit within Discord's message limit.
pub fn split_message(text: &str) -> Vec<String> {
    split_with_limit(text, DISCORD_MESSAGE_LIMIT)
}

fn push_hard_split(chunks: &mut Vec<String>, word: &str, limit: usize) {
    let chars: Vec<char> = word.chars().collect();
    for piece in chars.chunks(limit) {
        chunks.push(piece.iter().collect());
    }
}

pub fn split_with_limit(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    // Lines first, then words, then characters for anything still too long.
    for line in text.lines() {
        let line_len = line.chars().count();
        let current_len = current.chars().count();

        if current_len + line_len + 1 <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.trim().is_empty() {
            chunks.push(current.trim_end().to_string());
        }
        current.clear();

        if line_len <= limit {
            current.push_str(line);
            continue;
        }

        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > limit {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                push_hard_split(&mut chunks, word, limit);
                continue;
            }

            if current.chars().count() + word_len + 1 > limit && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim_end().to_string());
    }

    chunks
}

pub async fn send_long_message(ctx: &Context, channel_id: ChannelId, text: &str) -> Result<()> {
    for chunk in split_message(text) {
        channel_id.say(ctx, chunk).await?;
    }
    Ok(())
}
