use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{
    chart::Overlays,
    market::Timeframe,
};

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_TOP_LIMIT: usize = 5;
pub const MAX_TOP_LIMIT: usize = 10;
/// Trend needs MA50, and the daily window only holds 30 candles.
pub const DEFAULT_TREND_TIMEFRAME: Timeframe = Timeframe::FourHours;

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{1,30}$").expect("valid symbol regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?(\d+)>$").expect("valid mention regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopKind {
    #[default]
    Gainers,
    Losers,
    Volume,
}

impl TopKind {
    fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "gainers" => Some(TopKind::Gainers),
            "losers" => Some(TopKind::Losers),
            "volume" => Some(TopKind::Volume),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub overlays: Overlays,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Hello,
    Help,
    Price(Vec<String>),
    PriceDetails(Vec<String>),
    Top { kind: TopKind, limit: usize },
    Stats(String),
    Trending,
    News(Option<String>),
    Technical(String),
    Chart(ChartRequest),
    Trend { symbol: String, timeframe: Timeframe },
    Mod { user_id: u64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("Invalid timeframe: {0}. Valid: 1m 3m 5m 15m 30m 1h 2h 4h 6h 8h 12h 1d 3d 1w 1M")]
    InvalidTimeframe(String),
}

pub const COMMAND_DESCRIPTIONS: &[(&str, &str)] = &[
    ("hello", "Say hello."),
    ("help", "Display this text."),
    ("price <symbols…>", "Current price of one or more tokens."),
    ("p <ids…>", "Detailed price card for CoinGecko ids."),
    ("top [gainers|losers|volume] [limit]", "Top tokens by 24h change or volume."),
    ("stats <id>", "Market statistics for a token."),
    ("trending", "Trending tokens on CoinGecko."),
    ("news [query]", "Latest hot crypto news."),
    ("ta <symbol>", "Technical analysis with a daily chart."),
    (
        "chart <symbol> [timeframe] [ma7] [ma20] [ma50] [bb] [vol]",
        "Custom price chart.",
    ),
    ("trend <symbol> [timeframe]", "Trend prediction with key levels."),
    ("mod @user", "Grant the Mod role (admins only)."),
];

pub fn help_text(prefix: &str) -> String {
    let mut text = String::from("These commands are supported:\n");
    for (usage, description) in COMMAND_DESCRIPTIONS {
        text.push_str(&format!("`{}{}` - {}\n", prefix, usage, description));
    }
    text
}

fn symbol(token: Option<&str>, usage: &'static str) -> Result<String, CommandParseError> {
    let token = token.ok_or(CommandParseError::Usage(usage))?;
    if !SYMBOL_RE.is_match(token) {
        return Err(CommandParseError::InvalidSymbol(token.to_string()));
    }
    Ok(token.to_string())
}

fn symbols(tokens: &[&str], usage: &'static str) -> Result<Vec<String>, CommandParseError> {
    if tokens.is_empty() {
        return Err(CommandParseError::Usage(usage));
    }
    tokens
        .iter()
        .map(|t| symbol(Some(*t), usage).map(|s| s.to_lowercase()))
        .collect()
}

fn timeframe(token: &str) -> Result<Timeframe, CommandParseError> {
    token
        .parse()
        .map_err(|_| CommandParseError::InvalidTimeframe(token.to_string()))
}

fn chart_request(args: &[&str]) -> Result<ChartRequest, CommandParseError> {
    const USAGE: &str = "chart <symbol> [timeframe] [ma7] [ma20] [ma50] [bb] [vol]";

    let symbol = symbol(args.first().copied(), USAGE)?;
    let mut timeframe_arg = None;
    let mut overlays = Overlays {
        moving_averages: Vec::new(),
        bollinger: false,
        volume: false,
    };

    for token in args.iter().skip(1) {
        match token.to_lowercase().as_str() {
            "ma7" => overlays.moving_averages.push(7),
            "ma20" => overlays.moving_averages.push(20),
            "ma50" => overlays.moving_averages.push(50),
            "bb" => overlays.bollinger = true,
            "vol" | "volume" => overlays.volume = true,
            _ if timeframe_arg.is_none() => timeframe_arg = Some(timeframe(token)?),
            _ => return Err(CommandParseError::Usage(USAGE)),
        }
    }

    if overlays.moving_averages.is_empty() {
        overlays.moving_averages.push(7);
    }

    Ok(ChartRequest {
        symbol: symbol.to_uppercase(),
        timeframe: timeframe_arg.unwrap_or_default(),
        overlays: overlays.normalized(),
    })
}

fn top(args: &[&str]) -> Result<Command, CommandParseError> {
    const USAGE: &str = "top [gainers|losers|volume] [limit]";

    let mut kind = TopKind::default();
    let mut limit = DEFAULT_TOP_LIMIT;
    for token in args {
        if let Some(k) = TopKind::parse(token) {
            kind = k;
        } else if let Ok(n) = token.parse::<usize>() {
            limit = n.clamp(1, MAX_TOP_LIMIT);
        } else {
            return Err(CommandParseError::Usage(USAGE));
        }
    }

    Ok(Command::Top { kind, limit })
}

/// Parses a chat message. `Ok(None)` for text that is not a known command.
pub fn parse(text: &str, prefix: &str) -> Result<Option<Command>, CommandParseError> {
    let Some(body) = text.trim().strip_prefix(prefix) else {
        return Ok(None);
    };

    let mut tokens = body.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = tokens.collect();

    let command = match name.to_lowercase().as_str() {
        "hello" => Command::Hello,
        "help" => Command::Help,
        "price" => Command::Price(symbols(&args, "price <symbols…>")?),
        "p" => Command::PriceDetails(symbols(&args, "p <ids…>")?),
        "top" => top(&args)?,
        "stats" => Command::Stats(symbol(args.first().copied(), "stats <id>")?.to_lowercase()),
        "trending" => Command::Trending,
        "news" => Command::News((!args.is_empty()).then(|| args.join(" "))),
        "ta" => Command::Technical(symbol(args.first().copied(), "ta <symbol>")?.to_uppercase()),
        "chart" => Command::Chart(chart_request(&args)?),
        "trend" => {
            const USAGE: &str = "trend <symbol> [timeframe]";
            let symbol = symbol(args.first().copied(), USAGE)?.to_uppercase();
            let timeframe = match args.get(1) {
                Some(token) => timeframe(token)?,
                None => DEFAULT_TREND_TIMEFRAME,
            };
            Command::Trend { symbol, timeframe }
        }
        "mod" => {
            let user_id = args
                .first()
                .and_then(|t| MENTION_RE.captures(t))
                .and_then(|c| c[1].parse().ok())
                .ok_or(CommandParseError::Usage("mod @user"))?;
            Command::Mod { user_id }
        }
        _ => return Ok(None),
    };

    Ok(Some(command))
}
