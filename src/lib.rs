// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::application::{
    AuthGate, Backend, ExploreFilters, ExploreView, FileUpload, GateDecision, HomeFeed, NoteDetailView,
    ProfileView, TodoForm, TodoList, UploadForm, Uploader,
};
use crate::cli::args::{Args, Command, TodoCommand};
use crate::constants::PDF_CONTENT_TYPE;
use crate::domain::{Route, User};
use crate::infrastructure::{Config, SessionStore, SharedBackend};
use crate::ports::{Notifier, TerminalPresenter};

/// Everything a command needs for one run.
struct Session {
    config: Config,
    backend: SharedBackend,
    gate: AuthGate<SharedBackend>,
    presenter: TerminalPresenter,
    json: bool,
}

/// Prints pending notifications to stderr.
fn flush_toasts(presenter: &TerminalPresenter, notifier: &mut Notifier) {
    for toast in notifier.drain() {
        eprintln!("{}", presenter.render_toast(&toast));
    }
}

impl Session {
    fn flush(&self, notifier: &mut Notifier) {
        flush_toasts(&self.presenter, notifier);
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to serialize output")?
        );
        Ok(())
    }

    /// The signed-in user, when the gate lets `route` render.
    fn enter(&self, route: Route) -> Result<User> {
        match self.gate.resolve(route) {
            GateDecision::Render(_) => Ok(self.gate.require_user()?.clone()),
            GateDecision::Redirect(Route::SignIn) => {
                bail!("Not signed in. Run `studyshare login <EMAIL> --password <PASSWORD>` first")
            }
            other => bail!("Cannot open this page: {other:?}"),
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting studyshare with arguments");

    if let Command::Init { force } = &args.command {
        return init_config(args.config.as_deref(), *force);
    }

    let config = Config::load_or_default(args.config.as_deref())?;
    let session_store = SessionStore::default_path().map(SessionStore::new);
    let backend = infrastructure::connect(&config, session_store)?;

    let mut gate = AuthGate::new(backend.clone());
    gate.check_session();
    debug!(state = ?gate.state(), "Session checked");

    let mut session = Session {
        config,
        backend,
        gate,
        presenter: TerminalPresenter::new(),
        json: args.json,
    };

    match args.command {
        Command::Init { .. } => Ok(()),
        Command::Login { email, password } => login(&mut session, &email, &password),
        Command::Register { name, email, password } => register(&mut session, &name, &email, &password),
        Command::Logout => logout(&mut session),
        Command::Whoami => whoami(&session),
        Command::Feed => feed(&session),
        Command::Explore { search, kind, subject, year, sort_by, address } => {
            let filters = match address {
                Some(query) => ExploreFilters::from_query_string(&query),
                None => ExploreFilters {
                    search: search.unwrap_or_default(),
                    kind,
                    subject: subject.unwrap_or_default(),
                    year: year.unwrap_or_default(),
                    sort_by,
                },
            };
            explore(&session, filters)
        }
        Command::Show { note_id } => show(&session, &note_id),
        Command::Like { note_id } => like(&session, &note_id),
        Command::Download { note_id, output } => download(&session, &note_id, output),
        Command::Comment { note_id, content } => comment(&session, &note_id, &content),
        Command::Upload { file, title, description, subject, year, kind, tags } => {
            let form = UploadForm {
                title,
                description,
                subject,
                academic_year: year.unwrap_or_default(),
                kind,
                tags,
            };
            upload(&session, &file, &form)
        }
        Command::Profile { user_id } => profile(&session, user_id.as_deref()),
        Command::Todo { command } => todo(&session, command),
        Command::Route { path } => route(&session, &path),
    }
}

fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path().context("Could not determine config directory")?,
    };
    if path.exists() && !force {
        bail!("Config file {} already exists (use --force to overwrite)", path.display());
    }
    Config::default().save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn login(session: &mut Session, email: &str, password: &str) -> Result<()> {
    let result = session.gate.sign_in(email, password).map(|user| user.clone());
    flush_toasts(&session.presenter, session.gate.notifier());
    let user = result?;
    info!(user_id = %user.id, "Logged in");
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

fn register(session: &mut Session, name: &str, email: &str, password: &str) -> Result<()> {
    let result = session.gate.sign_up(name, email, password).map(|user| user.clone());
    flush_toasts(&session.presenter, session.gate.notifier());
    let user = result?;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

fn logout(session: &mut Session) -> Result<()> {
    let result = session.gate.sign_out();
    flush_toasts(&session.presenter, session.gate.notifier());
    Ok(result?)
}

fn whoami(session: &Session) -> Result<()> {
    let user = session.enter(Route::Profile(None))?;
    if session.json {
        return session.print_json(&user);
    }
    println!("{} <{}> ({})", user.name, user.email, user.id);
    Ok(())
}

fn feed(session: &Session) -> Result<()> {
    session.enter(Route::Home)?;
    let mut view = HomeFeed::new(session.backend.clone());
    view.refresh();
    session.flush(view.notifier());

    if session.json {
        return session.print_json(view.notes());
    }
    print!("{}", session.presenter.render_list(view.notes()));
    Ok(())
}

fn explore(session: &Session, filters: ExploreFilters) -> Result<()> {
    let route = Route::Explore(filters.to_query_string());
    session.enter(route)?;

    let mut view = ExploreView::new(session.backend.clone(), filters);
    view.refresh();
    session.flush(view.notifier());
    debug!(route = %view.route(), "Explore address");

    if session.json {
        return session.print_json(view.notes());
    }
    print!(
        "{}",
        session
            .presenter
            .render_explore(view.filters(), view.stats(), view.notes())
    );
    Ok(())
}

fn open_note(session: &Session, note_id: &str) -> Result<NoteDetailView<SharedBackend>> {
    let user = session.enter(Route::NoteDetail(note_id.to_string()))?;
    let mut view = NoteDetailView::new(session.backend.clone(), note_id, Some(&user));
    let loaded = view.load().map(|_| ());
    session.flush(view.notifier());
    if let Err(e) = loaded {
        if let Some(target) = view.redirect() {
            debug!(%target, "Note view redirected");
        }
        return Err(e).with_context(|| format!("Could not open note {note_id}"));
    }
    Ok(view)
}

fn show(session: &Session, note_id: &str) -> Result<()> {
    let view = open_note(session, note_id)?;
    let note = view.note().context("Note not loaded")?;

    if session.json {
        return session.print_json(&serde_json::json!({
            "note": note,
            "liked": view.like_state().liked(),
            "comments": view.comments(),
        }));
    }
    print!(
        "{}",
        session
            .presenter
            .render_detail(note, view.like_state(), view.comments())
    );
    println!("\nShare: {}", view.share_link(&session.config.backend.app_url));
    Ok(())
}

fn like(session: &Session, note_id: &str) -> Result<()> {
    let mut view = open_note(session, note_id)?;
    let result = view.toggle_like();
    session.flush(view.notifier());
    let liked = result?;

    let count = view.like_state().count();
    if session.json {
        return session.print_json(&serde_json::json!({ "liked": liked, "likes": count }));
    }
    println!("{} ({} likes)", if liked { "Liked" } else { "Unliked" }, count);
    Ok(())
}

fn download(session: &Session, note_id: &str, output: Option<PathBuf>) -> Result<()> {
    let mut view = open_note(session, note_id)?;
    let result = view.download();
    session.flush(view.notifier());
    let target = result?;

    let bytes = session
        .backend
        .fetch_file(&target.file_id)
        .with_context(|| format!("Failed to fetch {}", target.url))?;
    let path = output.unwrap_or_else(|| PathBuf::from(&target.file_name));
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = ?path, bytes = bytes.len(), "File saved");
    println!("Saved {} ({})", path.display(), util::text::format_file_size(bytes.len() as u64));
    Ok(())
}

fn comment(session: &Session, note_id: &str, content: &str) -> Result<()> {
    let mut view = open_note(session, note_id)?;
    let result = view.add_comment(content).map(|c| c.cloned());
    session.flush(view.notifier());

    match result? {
        Some(comment) if session.json => session.print_json(&comment),
        Some(_) => Ok(()),
        None => bail!("Comment is empty"),
    }
}

fn read_upload(path: &Path) -> Result<FileUpload> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Upload path has no file name")?;
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    let content_type = if is_pdf { PDF_CONTENT_TYPE } else { "application/octet-stream" };

    Ok(FileUpload {
        name,
        content_type: content_type.to_string(),
        bytes,
    })
}

fn upload(session: &Session, path: &Path, form: &UploadForm) -> Result<()> {
    let user = session.enter(Route::Upload)?;
    let file = read_upload(path)?;

    let mut uploader = Uploader::new(session.backend.clone(), &user);
    if !uploader.select_file(file) {
        session.flush(uploader.notifier());
        bail!("File rejected: {}", path.display());
    }
    let result = uploader.submit(form);
    session.flush(uploader.notifier());
    let route = result?;

    println!("Uploaded: {route}");
    Ok(())
}

fn profile(session: &Session, user_id: Option<&str>) -> Result<()> {
    let route = Route::Profile(user_id.map(str::to_string));
    let viewer = session.enter(route)?;

    let mut view = ProfileView::new(session.backend.clone(), &viewer, user_id);
    view.load();
    session.flush(view.notifier());

    if session.json {
        return session.print_json(&serde_json::json!({
            "userId": view.user_id(),
            "stats": view.stats(),
            "notes": view.notes(),
        }));
    }
    let shown = view.is_own_profile().then_some(&viewer);
    print!(
        "{}",
        session.presenter.render_profile(shown, view.stats(), view.notes())
    );
    Ok(())
}

fn todo(session: &Session, command: TodoCommand) -> Result<()> {
    let user = session.enter(Route::Todos)?;
    let mut list = TodoList::new(session.backend.clone(), &user);
    list.load();

    let result = match command {
        TodoCommand::List { filter } => {
            list.set_filter(filter);
            Ok(())
        }
        TodoCommand::Add { title, description, priority, due } => {
            let form = TodoForm {
                title,
                description,
                priority,
                due_date: due.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|d| d.and_utc()),
            };
            list.add(form).map(|_| ())
        }
        TodoCommand::Done { todo_id } => list.toggle(&todo_id).map(|_| ()),
        TodoCommand::Delete { todo_id } => list.delete(&todo_id),
    };
    session.flush(list.notifier());
    result?;

    let visible = list.visible();
    if session.json {
        return session.print_json(&visible);
    }
    print!("{}", session.presenter.render_todos(&visible));
    Ok(())
}

fn route(session: &Session, path: &str) -> Result<()> {
    let route = Route::parse(path);
    let decision = session.gate.resolve(route);
    match decision {
        GateDecision::Placeholder => println!("Loading..."),
        GateDecision::Render(route) => println!("render {route}"),
        GateDecision::Redirect(route) => println!("redirect {route}"),
    }
    Ok(())
}

#[cfg(test)]
/// must be public to be used from integration tests
mod tests {
    use crate::util::testing;
    #[ctor::ctor]
    fn init() {
        testing::init_test_setup().expect("Failed to initialize test setup");
    }
}
