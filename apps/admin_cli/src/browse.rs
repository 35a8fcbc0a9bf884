//! Interactive table session: page through products and edit them in place.

use anyhow::Result;
use client_core::{CatalogEvent, CatalogScreen, FormField};
use shared::domain::ProductId;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::broadcast,
};

use crate::render::{render_form, render_list, render_notice};

pub const HELP: &str = "\
commands:
  n | p                 next / previous page
  page <n>              jump to page n (1-based)
  size <n>              rows per page
  r                     reload the current page
  new                   open the create form
  edit <id>             open the edit form for a product
  set <field> <value>   set name, price or description on the open form
  save | cancel         submit or discard the open form
  del <id>              ask to delete a product, then 'yes' or 'no'
  find <price>          list products with exactly this price
  q                     quit";

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Next,
    Previous,
    Page(i64),
    Size(u32),
    Reload,
    New,
    Edit(ProductId),
    Set(FormField, String),
    Save,
    Cancel,
    Delete(ProductId),
    Confirm,
    Decline,
    Find(f64),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match head.to_ascii_lowercase().as_str() {
        "n" | "next" => BrowseCommand::Next,
        "p" | "prev" | "previous" => BrowseCommand::Previous,
        "page" => {
            let n: i64 = parse_arg(rest, "page number")?;
            BrowseCommand::Page(n - 1)
        }
        "size" => BrowseCommand::Size(parse_arg(rest, "page size")?),
        "r" | "reload" => BrowseCommand::Reload,
        "new" => BrowseCommand::New,
        "edit" => BrowseCommand::Edit(ProductId(parse_arg(rest, "product id")?)),
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = field.parse::<FormField>().map_err(|err| err.to_string())?;
            BrowseCommand::Set(field, value.trim().to_string())
        }
        "save" => BrowseCommand::Save,
        "cancel" => BrowseCommand::Cancel,
        "del" | "delete" => BrowseCommand::Delete(ProductId(parse_arg(rest, "product id")?)),
        "y" | "yes" => BrowseCommand::Confirm,
        "no" => BrowseCommand::Decline,
        "find" => BrowseCommand::Find(parse_arg(rest, "price")?),
        "h" | "help" | "?" => BrowseCommand::Help,
        "q" | "quit" | "exit" => BrowseCommand::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(command)
}

fn parse_arg<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("expected a {what}, got '{raw}'"))
}

/// Reads commands from `input` until `q` or end of input.
///
/// Notices are drained from `events` after every command, so the caller's
/// receiver is empty when the session ends.
pub async fn run<R>(
    screen: &mut CatalogScreen,
    events: &mut broadcast::Receiver<CatalogEvent>,
    input: R,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut input = BufReader::new(input);
    let mut buf = Vec::new();

    screen.list().refresh().await;
    flush_events(events);
    println!("{}", render_list(&screen.list().snapshot().await));
    println!("type 'help' for commands");

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let parsed = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => parse_command(line),
            Err(_) => Err("ignoring input that is not valid UTF-8".to_string()),
        };
        let command = match parsed {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        if command == BrowseCommand::Quit {
            break;
        }
        let redraw = apply(screen, command).await;
        flush_events(events);
        if redraw {
            println!("{}", render_list(&screen.list().snapshot().await));
        }
        if let Some(form) = screen.form() {
            println!("{}", render_form(form));
        }
    }
    Ok(())
}

/// Runs one command; returns whether the table should be redrawn.
async fn apply(screen: &mut CatalogScreen, command: BrowseCommand) -> bool {
    match command {
        BrowseCommand::Next => {
            screen.list().next_page().await;
            true
        }
        BrowseCommand::Previous => {
            screen.list().previous_page().await;
            true
        }
        BrowseCommand::Page(n) => {
            screen.list().set_page(n).await;
            true
        }
        BrowseCommand::Size(n) => {
            screen.list().set_page_size(n).await;
            true
        }
        BrowseCommand::Reload => {
            screen.list().refresh().await;
            true
        }
        BrowseCommand::New => {
            screen.open_create();
            false
        }
        BrowseCommand::Edit(id) => {
            let on_page = screen
                .list()
                .snapshot()
                .await
                .items
                .into_iter()
                .find(|p| p.id == id);
            let found = match on_page {
                Some(product) => Some(product),
                None => match screen.api().get_by_id(id).await {
                    Ok(product) => Some(product),
                    Err(err) => {
                        eprintln!("error: {err}");
                        None
                    }
                },
            };
            if let Some(product) = found {
                screen.open_edit(product);
            }
            false
        }
        BrowseCommand::Set(field, value) => {
            if let Err(err) = screen.set_field(field, &value) {
                eprintln!("error: {err}");
            }
            false
        }
        BrowseCommand::Save => match screen.submit_form().await {
            Ok(_) => true,
            Err(err) => {
                if !matches!(err, client_core::SubmitError::Rejected(_)) {
                    eprintln!("error: {err}");
                }
                false
            }
        },
        BrowseCommand::Cancel => {
            screen.cancel_form();
            false
        }
        BrowseCommand::Delete(id) => {
            screen.request_delete(id);
            println!("delete product {id}? (yes/no)");
            false
        }
        BrowseCommand::Confirm => matches!(screen.confirm_delete().await, Ok(Some(_))),
        BrowseCommand::Decline => {
            screen.cancel_delete();
            false
        }
        BrowseCommand::Find(price) => {
            match screen.api().get_by_price(price).await {
                Ok(products) => println!("{}", crate::render::product_table(&products)),
                Err(err) => eprintln!("error: {err}"),
            }
            false
        }
        BrowseCommand::Help => {
            println!("{HELP}");
            false
        }
        BrowseCommand::Quit => false,
    }
}

/// Counts of notices written by [`flush_events`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flushed {
    pub successes: usize,
    pub failures: usize,
}

impl Flushed {
    pub fn total(&self) -> usize {
        self.successes + self.failures
    }
}

/// Prints pending notices: successes to stdout, failures to stderr.
pub fn flush_events(events: &mut broadcast::Receiver<CatalogEvent>) -> Flushed {
    let mut flushed = Flushed::default();
    while let Ok(event) = events.try_recv() {
        if let CatalogEvent::Notice(notice) = event {
            if notice.is_failure() {
                eprintln!("{}", render_notice(&notice));
                flushed.failures += 1;
            } else {
                println!("{}", render_notice(&notice));
                flushed.successes += 1;
            }
        }
    }
    flushed
}
