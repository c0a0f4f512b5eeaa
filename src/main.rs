use std::collections::HashMap;
use std::io;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossterm::event::{Event, KeyCode, KeyModifiers};
use indoc::indoc;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use overlay_stack::constants::BASE_Z;
use overlay_stack::drivers::OutputDriver;
use overlay_stack::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use overlay_stack::event_loop::{ControlFlow, EventLoop};
use overlay_stack::log_buffer::{LogBufferHandle, install_panic_hook, set_global_log_buffer};
use overlay_stack::tracing_sub;
use overlay_stack::ui::{self, UiFrame};
use overlay_stack::{
    Document, DocumentError, FocusableContent, NodeId, NodeTree, OverlayConfig, OverlayHandle,
    OverlayKind, OverlayManager,
};

const DIALOG_COUNT: usize = 3;
const LOG_LINES: u16 = 8;

const INTRO: &str = indoc! {"
    Overlay stack demo.
    Press 1, 2 or 3 to open a dialog. Opening one that is already open brings it to the top.
    Tab and Shift+Tab move focus; focus that leaves the active dialog is sent back into it.
"};

const HELP: &str = " 1-3 open | Enter activate | c/Esc close | a close all | d destroy | q quit ";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    /// Content returns to the page on every close.
    Dialog,
    /// Content stays in its slot until the overlay is destroyed.
    Modal,
}

impl From<KindArg> for OverlayKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Dialog => OverlayKind::Dialog,
            KindArg::Modal => OverlayKind::Modal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "overlay-demo",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive demo of a shared overlay stack with backdrop and focus trap"
)]
struct DemoCli {
    /// Kind of overlay the demo registers.
    #[arg(short = 'k', long = "kind", value_enum, default_value_t = KindArg::Dialog)]
    kind: KindArg,

    /// Z-rank the active overlay sits one above.
    #[arg(long = "base-z", value_name = "Z", default_value_t = BASE_Z)]
    base_z: i32,

    /// Most verbose level written to the log pane.
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "debug")]
    log_level: tracing::Level,

    /// Milliseconds between deferred-work ticks when no input arrives.
    #[arg(long = "tick-ms", value_name = "MS", default_value_t = 16)]
    tick_ms: u64,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Open(usize),
    Close(usize),
}

struct Demo {
    overlays: OverlayManager<NodeTree>,
    dialogs: Vec<OverlayHandle>,
    actions: HashMap<NodeId, Action>,
    log: LogBufferHandle,
}

impl Demo {
    fn new(config: OverlayConfig, log: LogBufferHandle) -> Result<Self, DocumentError> {
        let mut doc = NodeTree::new();
        let mut actions = HashMap::new();
        let root = doc.root();
        let page = doc.create_element("main");
        doc.append_child(root, page)?;
        for line in INTRO.lines() {
            let p = doc.create_text("p", line);
            doc.append_child(page, p)?;
        }
        let opener = doc.add_control(page, "Open dialog 1")?;
        actions.insert(opener, Action::Open(0));

        // dialog content is declared on the page but never rendered there
        let templates = doc.create_element("div");
        doc.append_child(page, templates)?;
        doc.set_hidden(templates, true)?;

        let mut contents = Vec::with_capacity(DIALOG_COUNT);
        for index in 0..DIALOG_COUNT {
            let section = doc.create_element("section");
            doc.append_child(templates, section)?;
            let title = doc.create_text("h2", format!("Dialog {}", index + 1));
            doc.append_child(section, title)?;
            let body = doc.create_text("p", "Enter on a button activates it.");
            doc.append_child(section, body)?;
            let next = (index + 1) % DIALOG_COUNT;
            let open_next = doc.add_control(section, format!("Open dialog {}", next + 1))?;
            let close = doc.add_control(section, "Close")?;
            actions.insert(open_next, Action::Open(next));
            actions.insert(close, Action::Close(index));
            contents.push(FocusableContent::new(section).with_close_button(close));
        }

        let mut overlays = OverlayManager::with_config(doc, config);
        overlays.add_hook(|event| {
            tracing::info!(
                overlay = %event.handle,
                notification = %event.notification,
                depth = event.depth,
                "overlay event"
            );
        });
        let dialogs = contents
            .into_iter()
            .map(|content| overlays.register(content))
            .collect();
        Ok(Self {
            overlays,
            dialogs,
            actions,
            log,
        })
    }

    fn open(&mut self, index: usize) {
        let Some(handle) = self.dialogs.get(index).copied() else {
            return;
        };
        if let Err(err) = self.overlays.open(handle) {
            tracing::warn!(overlay = %handle, %err, "open rejected");
        }
    }

    fn close(&mut self, index: usize) {
        if let Some(handle) = self.dialogs.get(index).copied() {
            self.overlays.close(handle);
        }
    }

    fn activate(&mut self) {
        let focused = self.overlays.document().focused();
        match focused.and_then(|node| self.actions.get(&node).copied()) {
            Some(Action::Open(index)) => self.open(index),
            Some(Action::Close(index)) => self.close(index),
            None => {}
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let doc = self.overlays.document();
        let from = doc.focused();
        let Some(next) = doc.next_focusable(from, forward) else {
            return;
        };
        if let Some(from) = from {
            self.overlays.handle_focus_out(from);
        }
        match self.overlays.document_mut().focus(next) {
            Ok(true) => {
                self.overlays.handle_focus_in(next);
            }
            Ok(false) => {}
            Err(err) => tracing::warn!(node = %next, %err, "focus failed"),
        }
    }

    fn handle_event(&mut self, event: Event) -> ControlFlow {
        let Event::Key(key) = event else {
            return ControlFlow::Continue;
        };
        match key.code {
            KeyCode::Char('q') => return ControlFlow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ControlFlow::Quit;
            }
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(index) = c.to_digit(10).and_then(|d| usize::try_from(d).ok()) {
                    self.open(index.saturating_sub(1));
                }
            }
            KeyCode::Char('c') | KeyCode::Esc => {
                if let Some(active) = self.overlays.active() {
                    self.overlays.close(active);
                }
            }
            KeyCode::Char('a') => self.overlays.close_all(),
            KeyCode::Char('d') => {
                if let Some(active) = self.overlays.active() {
                    self.overlays.destroy(active);
                }
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            _ => {}
        }
        ControlFlow::Continue
    }

    fn render(&self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        let log_height = LOG_LINES.min(area.height / 3);
        let doc_area = Rect {
            height: area.height.saturating_sub(log_height + 1),
            ..area
        };
        let help_area = Rect {
            y: doc_area.y.saturating_add(doc_area.height),
            height: 1,
            ..area
        };
        let log_area = Rect {
            y: help_area.y.saturating_add(1),
            height: log_height,
            ..area
        };
        ui::render_document(frame, &self.overlays, doc_area);
        frame.render_widget(
            Paragraph::new(HELP).style(Style::default().add_modifier(Modifier::REVERSED)),
            help_area,
        );
        let lines: Vec<Line> = self
            .log
            .tail(log_height as usize)
            .into_iter()
            .map(Line::from)
            .collect();
        frame.render_widget(Paragraph::new(lines), log_area);
    }
}

fn main() -> io::Result<()> {
    let cli = DemoCli::parse();
    let log = LogBufferHandle::default();
    set_global_log_buffer(log.clone());
    install_panic_hook();
    tracing_sub::init_default(cli.log_level);

    let config = OverlayConfig::new()
        .with_base_z(cli.base_z)
        .with_default_kind(cli.kind.into());
    let mut demo = Demo::new(config, log).map_err(io::Error::other)?;
    tracing::info!(kind = ?cli.kind, base_z = cli.base_z, "demo started");

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(
        ConsoleInputDriver::new(),
        Duration::from_millis(cli.tick_ms),
    );
    let result = event_loop.run(|event| match event {
        None => {
            demo.overlays.tick();
            output.draw(|mut frame| demo.render(&mut frame))?;
            Ok(ControlFlow::Continue)
        }
        Some(event) => Ok(demo.handle_event(event)),
    });
    output.exit()?;
    result
}
