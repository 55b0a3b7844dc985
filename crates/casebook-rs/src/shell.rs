//! Line-oriented interactive menu driving the record store.

use crate::controller::{CommitOutcome, RecordDraft};
use casebook_rs_registry::{PersonRecord, RecordStore};
use log::{debug, info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tokio::task::JoinHandle;

const MENU: &str = "\
1) register person
2) list all
3) list infected
4) save snapshot
5) load snapshot
6) fetch remote record
0) quit";

/// Menu entries understood by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Register,
    ListAll,
    ListInfected,
    Save,
    Load,
    Fetch,
    Quit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Register),
            "2" => Some(Self::ListAll),
            "3" => Some(Self::ListInfected),
            "4" => Some(Self::Save),
            "5" => Some(Self::Load),
            "6" => Some(Self::Fetch),
            "0" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Interactive shell owning the store for the lifetime of a session.
pub struct Shell<R, W> {
    input: R,
    output: W,
    store: RecordStore,
    snapshot_path: PathBuf,
    pending: Vec<JoinHandle<()>>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, store: RecordStore, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            store,
            snapshot_path: snapshot_path.into(),
            pending: Vec::new(),
        }
    }

    /// Run the menu until the user quits or input ends.
    pub async fn run(&mut self) -> io::Result<()> {
        info!(
            "shell started (snapshot={}, records={})",
            self.snapshot_path.display(),
            self.store.len()
        );
        loop {
            writeln!(self.output, "\n{MENU}")?;
            let Some(line) = self.prompt("> ")? else {
                break;
            };
            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.output, "unknown option: {}", line.trim())?;
                continue;
            };
            debug!("menu choice: {choice:?}");
            match choice {
                MenuChoice::Register => self.register()?,
                MenuChoice::ListAll => {
                    let rows: Vec<String> = self.store.records().iter().map(render_row).collect();
                    self.print_rows(&rows)?;
                }
                MenuChoice::ListInfected => {
                    let rows: Vec<String> = self.store.infected().map(render_row).collect();
                    self.print_rows(&rows)?;
                }
                MenuChoice::Save => self.save()?,
                MenuChoice::Load => self.load()?,
                MenuChoice::Fetch => self.fetch().await?,
                MenuChoice::Quit => break,
            }
        }
        Ok(())
    }

    /// Wait for background upserts started by this shell, then hand back the store.
    pub async fn finish(mut self) -> RecordStore {
        for handle in self.pending.drain(..) {
            if let Err(err) = handle.await {
                warn!("background upsert did not complete: {err}");
            }
        }
        self.store
    }

    /// Keep `handle` until `finish`, dropping handles whose task already ended.
    fn track(&mut self, handle: JoinHandle<()>) {
        self.pending.retain(|pending| !pending.is_finished());
        self.pending.push(handle);
    }

    fn register(&mut self) -> io::Result<()> {
        let mut draft = RecordDraft::new();
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(());
        };
        draft.set_name(name.trim());
        let Some(condition) = self.prompt("Additional conditions: ")? else {
            return Ok(());
        };
        draft.set_condition(condition.trim());
        loop {
            let Some(answer) = self.prompt("Infected? (1-yes 0-no): ")? else {
                return Ok(());
            };
            let applied = answer
                .trim()
                .parse::<i64>()
                .map_err(|_| ())
                .and_then(|choice| draft.set_infected_choice(choice).map_err(|_| ()));
            if applied.is_ok() {
                break;
            }
        }
        writeln!(
            self.output,
            "{}\n{}\n{}",
            draft.name(),
            draft.is_infected(),
            draft.condition()
        )?;
        match draft.commit(&mut self.store) {
            Ok(CommitOutcome::Added { record, upsert }) => {
                self.track(upsert);
                writeln!(self.output, "added (id={})", record.id())
            }
            Ok(CommitOutcome::Duplicate(record)) => {
                writeln!(self.output, "duplicate: {}", record.describe())
            }
            Err(err) => writeln!(self.output, "register failed: {err}"),
        }
    }

    fn save(&mut self) -> io::Result<()> {
        match self.store.save_snapshot(&self.snapshot_path) {
            Ok(true) => writeln!(self.output, "saved"),
            Ok(false) => writeln!(self.output, "not saved"),
            Err(err) => writeln!(self.output, "save failed: {err}"),
        }
    }

    fn load(&mut self) -> io::Result<()> {
        match self.store.load_snapshot(&self.snapshot_path) {
            Ok(true) => writeln!(self.output, "loaded"),
            Ok(false) => writeln!(self.output, "not loaded"),
            Err(err) => writeln!(self.output, "load failed: {err}"),
        }
    }

    async fn fetch(&mut self) -> io::Result<()> {
        let Some(answer) = self.prompt("Id: ")? else {
            return Ok(());
        };
        let Ok(id) = answer.trim().parse::<u64>() else {
            return writeln!(self.output, "invalid id: {}", answer.trim());
        };
        match self.store.fetch_remote(id).await {
            Ok(Some(record)) => writeln!(self.output, "{}", render_row(&record)),
            Ok(None) => writeln!(self.output, "not found"),
            Err(err) => writeln!(self.output, "fetch failed: {err}"),
        }
    }

    fn print_rows(&mut self, rows: &[String]) -> io::Result<()> {
        if rows.is_empty() {
            return writeln!(self.output, "(none)");
        }
        for row in rows {
            writeln!(self.output, "{row}")?;
        }
        Ok(())
    }

    /// Print `label` and read one line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

fn render_row(record: &PersonRecord) -> String {
    let condition = if record.condition().is_empty() {
        "-"
    } else {
        record.condition()
    };
    format!(
        "{}\t{}\t{}\tinfected={}\t{}",
        record.id(),
        record.name(),
        condition,
        record.is_infected(),
        record.created_at()
    )
}

#[cfg(test)]
mod tests {
    use super::{MenuChoice, Shell};
    use casebook_rs_test_utils::offline_store;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tokio::task::JoinHandle;

    fn idle_shell() -> Shell<Cursor<&'static str>, Vec<u8>> {
        Shell::new(Cursor::new(""), Vec::new(), offline_store(), "cases.bin")
    }

    async fn finished_task() -> JoinHandle<()> {
        let handle = tokio::spawn(async {});
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        handle
    }

    #[tokio::test]
    async fn finished_upserts_are_pruned() {
        let mut shell = idle_shell();
        for _ in 0..5 {
            let handle = finished_task().await;
            shell.track(handle);
        }
        assert_eq!(shell.pending.len(), 1);
        shell.finish().await;
    }

    #[tokio::test]
    async fn panicked_upsert_does_not_abort_finish() {
        let mut shell = idle_shell();
        shell.track(tokio::spawn(async { panic!("upsert task blew up") }));
        let store = shell.finish().await;
        assert!(store.is_empty());
    }

    #[test]
    fn menu_choice_parses_digits() {
        assert_eq!(MenuChoice::parse(" 1 "), Some(MenuChoice::Register));
        assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("9"), None);
    }
}
