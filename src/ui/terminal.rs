use calloop::channel::{self, Channel, Event};
use calloop::EventLoop;
use log::{debug, info};
use std::io::{BufRead, Write};
use std::thread;

use crate::debounce::LoopDebouncer;
use crate::error::Result;
use crate::state::AppState;
use crate::ui::render;

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Query(String),
    Next,
    Prev,
    First,
    Last,
    Page(i64),
    Size(usize),
    Scan(String),
    Suggest(String),
    Quit,
    Unknown(String),
}

impl Input {
    /// Lines starting with `:` are commands; anything else is query text.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(command) = line.strip_prefix(':') else {
            return Input::Query(line.to_string());
        };
        let (name, arg) = match command.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name {
            "n" | "next" => Input::Next,
            "p" | "prev" => Input::Prev,
            "first" => Input::First,
            "last" => Input::Last,
            "page" => arg.parse().map(Input::Page).unwrap_or_else(|_| Input::Unknown(line.to_string())),
            "size" => arg.parse().map(Input::Size).unwrap_or_else(|_| Input::Unknown(line.to_string())),
            "scan" => Input::Scan(arg.to_string()),
            "suggest" => Input::Suggest(arg.to_string()),
            "q" | "quit" => Input::Quit,
            _ => Input::Unknown(line.to_string()),
        }
    }
}

pub struct TerminalApp<W: Write + 'static> {
    pub state: AppState,
    pub out: W,
    pub should_exit: bool,
    input_closed: bool,
    debouncer: Option<LoopDebouncer<String, TerminalApp<W>>>,
}

impl<W: Write + 'static> TerminalApp<W> {
    pub fn new(state: AppState, out: W) -> Self {
        Self {
            state,
            out,
            should_exit: false,
            input_closed: false,
            debouncer: None,
        }
    }

    fn draw(&mut self) {
        let page = render::render_page(&self.state);
        let _ = write!(self.out, "{}", page);
        let _ = self.out.flush();
    }

    fn say(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }

    fn handle_input(&mut self, input: Input) -> Result<()> {
        debug!("TerminalApp: input {:?}", input);
        match input {
            Input::Query(text) => {
                if let Some(debouncer) = self.debouncer.as_mut() {
                    debouncer.push(text)?;
                } else {
                    self.state.apply_query(&text);
                    self.draw();
                }
                return Ok(());
            }
            Input::Next => {
                if !self.state.next_page() {
                    self.say("Already on the last page");
                    return Ok(());
                }
            }
            Input::Prev => {
                if !self.state.prev_page() {
                    self.say("Already on the first page");
                    return Ok(());
                }
            }
            Input::First => {
                self.state.first_page();
            }
            Input::Last => {
                self.state.last_page();
            }
            Input::Page(n) => {
                self.state.go_to_page(n);
            }
            Input::Size(n) => {
                if let Err(e) = self.state.change_page_size(n) {
                    self.say(&e.to_string());
                    return Ok(());
                }
            }
            Input::Scan(code) => {
                let line = render::render_lookup(self.state.lookup(&code).as_ref());
                self.say(&line);
                return Ok(());
            }
            Input::Suggest(partial) => {
                let suggestions = self.state.suggestions(&partial, 10);
                let line = if suggestions.is_empty() {
                    "No suggestions".to_string()
                } else {
                    suggestions.join(", ")
                };
                self.say(&line);
                return Ok(());
            }
            Input::Quit => {
                self.should_exit = true;
                return Ok(());
            }
            Input::Unknown(line) => {
                self.say(&format!("Unknown command: {}", line));
                return Ok(());
            }
        }
        self.draw();
        Ok(())
    }

    fn idle(&self) -> bool {
        self.debouncer.as_ref().is_none_or(|d| !d.is_pending())
    }
}

/// Runs the session until `:quit` or end of input. Query lines go through a
/// debounce timer so only the last of a burst is searched.
pub fn run<R, W>(state: AppState, input: R, out: W) -> Result<AppState>
where
    R: BufRead + Send + 'static,
    W: Write + 'static,
{
    let delay = state.config.search.debounce_delay();
    let mut event_loop: EventLoop<'static, TerminalApp<W>> = EventLoop::try_new()?;
    let mut app = TerminalApp::new(state, out);

    app.debouncer = Some(LoopDebouncer::new(
        event_loop.handle(),
        delay,
        |query: String, app: &mut TerminalApp<W>| {
            app.state.apply_query(&query);
            app.draw();
        },
    ));

    let (tx, rx): (channel::Sender<String>, Channel<String>) = channel::channel();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    event_loop
        .handle()
        .insert_source(rx, |event, _, app: &mut TerminalApp<W>| match event {
            Event::Msg(line) => {
                if let Err(e) = app.handle_input(Input::parse(&line)) {
                    log::error!("TerminalApp: {}", e);
                    app.should_exit = true;
                }
            }
            Event::Closed => app.input_closed = true,
        })
        .map_err(|e| e.error)?;

    app.draw();
    loop {
        if app.should_exit || (app.input_closed && app.idle()) {
            break;
        }
        event_loop.dispatch(None, &mut app)?;
    }

    info!("TerminalApp: session ended with {} results", app.state.result_count());
    // Cancels a still-pending search before the loop goes away.
    app.debouncer = None;
    Ok(app.state)
}
