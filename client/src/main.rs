// client/src/main.rs - Trading Engine Client & Bots
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use console::{style, Term};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    signal,
    time::sleep,
};
use tracing::{debug, info, warn, Level};

#[derive(Parser)]
#[command(name = "trading-client")]
#[command(about = "Client and trading bots for the trading engine")]
#[command(version)]
pub struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub server: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session: type protocol commands, see raw responses
    Interactive,

    /// Quote both sides of a symbol around a drifting base price
    MarketMaker {
        /// Symbol to quote
        symbol: String,

        /// Starting base price
        base_price: f64,

        /// Half-spread between the quotes and the base price
        #[arg(long, default_value = "0.50")]
        spread: f64,

        /// Quantity per quote
        #[arg(long, default_value = "50")]
        size: u32,

        /// Delay between quote rounds (ms)
        #[arg(long, default_value = "2000")]
        interval_ms: u64,
    },

    /// Fire random orders inside a price band
    RandomTrader {
        /// Symbol to trade
        symbol: String,

        /// Lower bound of the price band
        min_price: f64,

        /// Upper bound of the price band
        max_price: f64,

        /// Minimum order quantity
        #[arg(long, default_value = "10")]
        min_quantity: u32,

        /// Maximum order quantity
        #[arg(long, default_value = "100")]
        max_quantity: u32,
    },

    /// Buy below a target price, sell above another, track profit
    Arbitrage {
        /// Symbol to watch
        symbol: String,

        /// Buy when the best ask drops below this price
        buy_target: f64,

        /// Sell when the best bid rises above this price
        sell_target: f64,

        /// Quantity per trade
        #[arg(long, default_value = "50")]
        size: u32,
    },
}

/// A line-protocol connection to the trading server.
///
/// Requests are single `\n`-terminated lines; the server answers with one or
/// more lines, read here as a single buffer per request.
pub struct ServerConnection {
    stream: TcpStream,
}

impl ServerConnection {
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("failed to connect to server at {addr}"))?;
        info!(%addr, "connected to trading server");
        Ok(Self { stream })
    }

    /// Send one command and read the response.
    pub async fn send_command(&mut self, command: &str) -> Result<String> {
        self.stream
            .write_all(format!("{command}\n").as_bytes())
            .await
            .context("failed to send command")?;

        let mut buf = [0u8; 4096];
        let read = self
            .stream
            .read(&mut buf)
            .await
            .context("failed to read response")?;
        if read == 0 {
            bail!("server closed the connection");
        }

        Ok(String::from_utf8_lossy(&buf[..read]).into_owned())
    }

    /// Say goodbye; the server closes the socket afterwards.
    pub async fn disconnect(mut self) {
        if let Ok(reply) = self.send_command("DISCONNECT").await {
            debug!(reply = reply.trim(), "disconnected");
        }
    }
}

/// Best bid and ask prices scraped from a `SHOW_ORDERS` response.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct TopOfBook {
    best_bid: Option<f64>,
    best_ask: Option<f64>,
}

impl TopOfBook {
    /// The first entry under each section header is the best of that side,
    /// since the server renders both sides in priority order.
    fn parse(snapshot: &str) -> Self {
        let mut top = Self::default();
        let mut in_buys = false;
        let mut in_sells = false;

        for line in snapshot.lines() {
            if line.contains("BUY ORDERS") {
                in_buys = true;
                in_sells = false;
            } else if line.contains("SELL ORDERS") {
                in_sells = true;
                in_buys = false;
            } else if let Some((_, price)) = line.split_once("@ $") {
                let Ok(price) = price.trim().parse::<f64>() else {
                    continue;
                };
                if in_buys && top.best_bid.is_none() {
                    top.best_bid = Some(price);
                }
                if in_sells && top.best_ask.is_none() {
                    top.best_ask = Some(price);
                }
            }
        }

        top
    }
}

async fn run_interactive(mut conn: ServerConnection) -> Result<()> {
    let term = Term::stdout();

    term.write_line(&style("=== Trading Engine Client ===").bold().to_string())?;
    term.write_line("Commands:")?;
    term.write_line("  ADD_ORDER <BUY|SELL> <SYMBOL> <PRICE> <QUANTITY>")?;
    term.write_line("  SHOW_ORDERS <SYMBOL>")?;
    term.write_line("  DISCONNECT")?;
    term.write_line("")?;

    loop {
        term.write_str("> ")?;
        let line = term.read_line()?.trim().to_string();

        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            conn.disconnect().await;
            break;
        }

        let response = conn.send_command(&line).await?;
        term.write_str(&response)?;

        if line.starts_with("DISCONNECT") {
            break;
        }
    }

    term.write_line("Disconnected from server.")?;
    Ok(())
}

async fn run_market_maker(
    mut conn: ServerConnection,
    symbol: String,
    mut base_price: f64,
    spread: f64,
    size: u32,
    interval_ms: u64,
) -> Result<()> {
    info!(%symbol, base_price, spread, size, "market maker running, Ctrl+C to stop");
    let mut rng = StdRng::from_entropy();

    loop {
        let buy_price = ((base_price - spread) * 100.0).round() / 100.0;
        let sell_price = ((base_price + spread) * 100.0).round() / 100.0;

        let reply = conn
            .send_command(&format!("ADD_ORDER BUY {symbol} {buy_price:.2} {size}"))
            .await?;
        debug!(reply = reply.trim(), "buy quote placed");

        let reply = conn
            .send_command(&format!("ADD_ORDER SELL {symbol} {sell_price:.2} {size}"))
            .await?;
        debug!(reply = reply.trim(), "sell quote placed");

        info!("placed quotes: BUY @ ${buy_price:.2} | SELL @ ${sell_price:.2}");

        // Drift the base price by one tick up, down, or not at all.
        base_price += f64::from(rng.gen_range(-1..=1)) * 0.25;

        tokio::select! {
            () = sleep(Duration::from_millis(interval_ms)) => {}
            _ = signal::ctrl_c() => break,
        }
    }

    conn.disconnect().await;
    info!("market maker stopped");
    Ok(())
}

async fn run_random_trader(
    mut conn: ServerConnection,
    symbol: String,
    min_price: f64,
    max_price: f64,
    min_quantity: u32,
    max_quantity: u32,
) -> Result<()> {
    if max_price < min_price || max_quantity < min_quantity {
        bail!("price and quantity ranges must be ordered low to high");
    }
    info!(%symbol, min_price, max_price, "random trader running, Ctrl+C to stop");
    let mut rng = StdRng::from_entropy();

    loop {
        let side = if rng.gen_bool(0.5) { "BUY" } else { "SELL" };
        let price = (rng.gen_range(min_price..=max_price) * 100.0).round() / 100.0;
        let quantity = rng.gen_range(min_quantity..=max_quantity);

        let response = conn
            .send_command(&format!("ADD_ORDER {side} {symbol} {price:.2} {quantity}"))
            .await?;

        if response.contains("TRADE EXECUTED") {
            info!("{side} {quantity} @ ${price:.2} - trade matched!");
        } else {
            info!("{side} {quantity} @ ${price:.2}");
        }

        let wait = Duration::from_secs(rng.gen_range(1..=5));
        tokio::select! {
            () = sleep(wait) => {}
            _ = signal::ctrl_c() => break,
        }
    }

    conn.disconnect().await;
    info!("random trader stopped");
    Ok(())
}

async fn run_arbitrage(
    mut conn: ServerConnection,
    symbol: String,
    buy_target: f64,
    sell_target: f64,
    size: u32,
) -> Result<()> {
    info!(%symbol, buy_target, sell_target, "arbitrage bot running, Ctrl+C to stop");
    let mut position: i64 = 0;
    let mut total_profit = 0.0;

    loop {
        let snapshot = conn.send_command(&format!("SHOW_ORDERS {symbol}")).await?;
        let top = TopOfBook::parse(&snapshot);

        match (top.best_bid, top.best_ask) {
            (None, None) => {
                info!("waiting for orders to appear in the book...");
                tokio::select! {
                    () = sleep(Duration::from_millis(2000)) => continue,
                    _ = signal::ctrl_c() => break,
                }
            }
            (Some(bid), Some(ask)) => {
                info!(
                    "market: BID ${bid:.2} | ASK ${ask:.2} | spread ${:.2}",
                    ask - bid
                );
            }
            _ => {}
        }

        if let Some(ask) = top.best_ask {
            if ask < buy_target && position <= 0 {
                info!("buy opportunity: ${ask:.2} < target ${buy_target:.2}");
                let reply = conn
                    .send_command(&format!("ADD_ORDER BUY {symbol} {ask:.2} {size}"))
                    .await?;
                debug!(reply = reply.trim(), "buy sent");
                position += i64::from(size);
                info!("bought {size} @ ${ask:.2} (position: {position})");
            }
        }

        if let Some(bid) = top.best_bid {
            if bid > sell_target && position > 0 {
                info!("sell opportunity: ${bid:.2} > target ${sell_target:.2}");
                let profit = (bid - buy_target) * f64::from(size);
                total_profit += profit;

                let reply = conn
                    .send_command(&format!("ADD_ORDER SELL {symbol} {bid:.2} {size}"))
                    .await?;
                debug!(reply = reply.trim(), "sell sent");
                position -= i64::from(size);
                info!("sold {size} @ ${bid:.2} (position: {position})");
                info!("profit on this trade: ${profit:.2} | total: ${total_profit:.2}");
            }
        }

        tokio::select! {
            () = sleep(Duration::from_millis(500)) => {}
            _ = signal::ctrl_c() => break,
        }
    }

    conn.disconnect().await;
    info!("arbitrage bot stopped, total profit ${total_profit:.2}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().map_err(|err| anyhow!("Failed to install color_eyre: {err}"))?;

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let conn = ServerConnection::connect(&args.server).await.map_err(|e| {
        warn!("is the trading server running?");
        e
    })?;

    match args.command {
        Commands::Interactive => run_interactive(conn).await,
        Commands::MarketMaker {
            symbol,
            base_price,
            spread,
            size,
            interval_ms,
        } => run_market_maker(conn, symbol, base_price, spread, size, interval_ms).await,
        Commands::RandomTrader {
            symbol,
            min_price,
            max_price,
            min_quantity,
            max_quantity,
        } => {
            run_random_trader(conn, symbol, min_price, max_price, min_quantity, max_quantity).await
        }
        Commands::Arbitrage {
            symbol,
            buy_target,
            sell_target,
            size,
        } => run_arbitrage(conn, symbol, buy_target, sell_target, size).await,
    }
}
