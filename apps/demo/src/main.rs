use anyhow::Result;
use bridge::{DisplayEvent, DisplaySubscription, UserBridge};
use clap::Parser;
use shared::domain::User;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use userstore::InMemoryUserStore;

mod config;

#[derive(Parser, Debug)]
struct Args {
    /// Seed user name; overrides demo.toml and DEMO__INITIAL_NAME.
    #[arg(long)]
    initial_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();

    let store = match args.initial_name.or(settings.initial_name) {
        Some(name) => InMemoryUserStore::with_user(User::new(name)),
        None => InMemoryUserStore::new(),
    };
    let bridge = UserBridge::new(store);

    let (display_tx, mut display_rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(async move {
        while let Some(event) = display_rx.recv().await {
            match event {
                DisplayEvent::NameChanged(name) => println!("user name: {name}"),
                DisplayEvent::StreamClosed(err) => {
                    eprintln!("display stream closed: {err}");
                    break;
                }
            }
        }
    });

    let subscription = DisplaySubscription::new(bridge.clone(), display_tx);
    subscription.activate();

    println!("type a new name and press enter (ctrl-d to quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        bridge.set_pending_edit(input);
        // one commit per trigger; a failure keeps the typed input
        if let Err(err) = bridge.commit_edit().await {
            eprintln!("update failed, edit kept: {err}");
        }
    }

    subscription.deactivate();
    renderer.abort();
    Ok(())
}
