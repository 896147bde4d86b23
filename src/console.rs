//! Line-oriented console transport
//!
//! Development stand-in for a real chat transport: renders responses and
//! menus to stdout, reads lines from stdin, and maps them back onto inbound
//! events. Button presses are simulated by typing the tag shown next to a
//! menu entry; anything else is delivered as message text.

use crate::engine::Event;
use crate::menu::MenuItem;
use crate::runtime::{Outbound, RuntimeManager};
use crate::store::UserId;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// The console serves a single local user.
const LOCAL_USER: UserId = UserId(0);

pub async fn run(manager: Arc<RuntimeManager>, mut outbound_rx: mpsc::Receiver<Outbound>) {
    println!("taskbot console; type /start to begin, /quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_menu: Vec<MenuItem> = vec![];

    loop {
        tokio::select! {
            maybe = outbound_rx.recv() => match maybe {
                Some(outbound) => {
                    println!("{}", outbound.response.text);
                    for item in &outbound.response.menu {
                        println!("  [{}] {}", item.tag, item.label);
                    }
                    last_menu = outbound.response.menu;
                }
                None => break,
            },

            maybe = lines.next_line() => match maybe {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match parse_line(line, &last_menu) {
                        Input::Quit => break,
                        Input::Event(event) => manager.dispatch(LOCAL_USER, event).await,
                    }
                }
                Ok(None) | Err(_) => break,
            },
        }
    }
}

enum Input {
    Quit,
    Event(Event),
}

/// A line is a command, a tag of the menu currently on screen, or free text.
fn parse_line(line: &str, menu: &[MenuItem]) -> Input {
    match line {
        "/quit" | "/exit" => Input::Quit,
        "/start" => Input::Event(Event::Start),
        _ if menu.iter().any(|item| item.tag == line) => Input::Event(Event::from_tag(line)),
        _ => Input::Event(Event::Text {
            text: line.to_string(),
        }),
    }
}
