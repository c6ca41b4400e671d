//! CLI module for the buddydocs application
//!
//! This module handles the command-line interface for interacting with the
//! document store. It plays the part of the UI collaborator: it owns no
//! invariants and only calls the store and query service.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
};

use chrono::Utc;
use console::style;
use log::{debug, info};
use shell_words::split;
use tempfile::Builder;
use terminal_size::{terminal_size, Width};

use crate::{
    parse_deadline, status_label, type_color, AppState, Commands, Config, DocsError, Document,
    DocumentDraft, DocumentId, DocumentQueryService, DocumentStore, DocumentType, Result,
};

/// Prefix of the instruction lines written into the editor buffer.
const EDITOR_MARKER: &str = "<!-- buddydocs:";

/// CLI Application handler - processes CLI commands and interfaces with the store
pub struct App {
    store: Arc<DocumentStore>,

    query: DocumentQueryService,

    /// Application configuration
    config: Config,

    /// Where `config` was loaded from
    config_path: Option<PathBuf>,
}

impl App {
    /// Create a new CLI application with the given config
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        let store = Arc::new(DocumentStore::new(config.data_dir.clone()));
        let query = DocumentQueryService::new(Arc::clone(&store));
        Self {
            store,
            query,
            config,
            config_path,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Create {
                title,
                doc_type,
                content,
                deadline,
                pin,
            } => self.handle_create(title, doc_type, content, deadline, pin).await?,

            Commands::View { id, json } => self.handle_view(&id, json).await?,

            Commands::List {
                filter,
                query,
                limit,
                json,
            } => self.handle_list(filter, query, limit, json).await?,

            Commands::Search {
                query,
                filter,
                json,
            } => self.handle_list(filter, query, None, json).await?,

            Commands::Edit {
                id,
                title,
                content,
                file,
            } => self.handle_edit(&id, title, content, file).await?,

            Commands::Rename { id, title } => {
                let doc = self.store.rename(id.parse()?, &title).await?;
                println!("Renamed {} to '{}'", doc.id, doc.title);
            }

            Commands::Pin { id } => {
                let pinned = self.store.toggle_pinned(id.parse()?).await?;
                println!("Document {} {}", id, if pinned { "pinned" } else { "unpinned" });
            }

            Commands::Complete { id } => {
                let completed = self.store.toggle_completed(id.parse()?).await?;
                println!(
                    "Document {} marked {}",
                    id,
                    if completed { "completed" } else { "not completed" }
                );
            }

            Commands::Deadline { id, date, clear } => {
                let deadline = match (date, clear) {
                    (_, true) | (None, _) => None,
                    (Some(d), false) => Some(parse_deadline(&d)?),
                };
                let doc = self.store.set_deadline(id.parse()?, deadline).await?;
                match doc.deadline {
                    Some(d) => println!("Deadline for {} set to {}", doc.id, d.format("%Y-%m-%d %H:%M")),
                    None => println!("Deadline for {} cleared", doc.id),
                }
            }

            Commands::Delete {
                id,
                force,
                missing_ok,
            } => self.handle_delete(id.parse()?, force, missing_ok).await?,

            Commands::Config { reset } => self.handle_config(reset)?,
        }

        Ok(())
    }

    async fn handle_create(
        &self,
        title: String,
        doc_type: Option<String>,
        content: Option<String>,
        deadline: Option<String>,
        pin: bool,
    ) -> Result<()> {
        let doc_type = match doc_type {
            Some(t) => t.parse::<DocumentType>()?,
            None => self.config.default_type.clone(),
        };

        let mut draft = DocumentDraft::new(title, doc_type.clone())
            .with_content(content.unwrap_or_default())
            .pinned(pin);
        if let Some(d) = deadline {
            draft = draft.with_deadline(parse_deadline(&d)?);
        }

        let label = draft.title.trim().to_string();
        let id = self.store.create(draft).await?;
        println!("Created new {}: {} (ID {})", doc_type, label, id);
        Ok(())
    }

    async fn handle_view(&self, id: &str, json: bool) -> Result<()> {
        let doc = self.store.get_by_id(id.parse()?).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&doc)?);
            return Ok(());
        }

        println!("{}", style(&doc.title).bold());
        println!(
            "{} • {} • by {}",
            styled_type(&doc.doc_type),
            status_label(&doc, Utc::now()),
            doc.author
        );
        println!("ID:       {}", doc.id);
        println!("Created:  {}", doc.created.format("%Y-%m-%d %H:%M:%S"));
        println!("Modified: {}", doc.last_modified.format("%Y-%m-%d %H:%M:%S"));
        if doc.pinned {
            println!("Pinned");
        }
        if let Some(deadline) = doc.deadline {
            println!("Deadline: {}", deadline.format("%Y-%m-%d %H:%M"));
        }
        if !doc.content.is_empty() {
            println!("\n{}", doc.content);
        }
        Ok(())
    }

    async fn handle_list(
        &self,
        filter: String,
        query: String,
        limit: Option<usize>,
        json: bool,
    ) -> Result<()> {
        let unfiltered = (filter.is_empty() || filter.eq_ignore_ascii_case("all"))
            && query.trim().is_empty();
        let mut state = AppState::new().with_filter(filter).with_query(query);
        let docs = state.visible(&self.query).await?;
        let limit = limit.unwrap_or(self.config.list_limit);
        let shown = &docs[..docs.len().min(limit)];

        if json {
            println!("{}", serde_json::to_string_pretty(shown)?);
            return Ok(());
        }

        if docs.is_empty() {
            if unfiltered {
                println!("No documents yet. Get started with `buddydocs create --title <TITLE>`.");
            } else {
                println!("No documents match.");
            }
            return Ok(());
        }

        self.display_documents(shown);
        if shown.len() < docs.len() {
            println!("... and {} more", docs.len() - shown.len());
        }
        Ok(())
    }

    fn display_documents(&self, docs: &[Document]) {
        let width = terminal_size()
            .map(|(Width(w), _)| w as usize)
            .unwrap_or(80);
        let now = Utc::now();

        for doc in docs {
            let marker = if doc.pinned { "*" } else { " " };
            let status = status_label(doc, now);
            let kind = doc.doc_type.label();
            // id column + marker + type + status + separators
            let fixed = 6 + 2 + kind.len() + status.len() + 6;
            let title = truncate(&doc.title, width.saturating_sub(fixed).max(10));
            println!(
                "{:>5} {} {}  {}  {}",
                doc.id,
                marker,
                title,
                styled_type(&doc.doc_type),
                style(status).dim()
            );
        }
    }

    async fn handle_edit(
        &self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<()> {
        let id: DocumentId = id.parse()?;
        let doc = self.store.get_by_id(id).await?;

        let new_content = match (content, file) {
            (Some(c), _) => c,
            (_, Some(path)) => self.read_content_from_file(&path)?,
            (None, None) => self.open_editor_with_content(&doc.title, &doc.content)?,
        };
        let new_title = title.unwrap_or_else(|| doc.title.clone());

        let saved = self.store.save(id, &new_title, &new_content).await?;
        println!("Document {} saved", saved.id);
        Ok(())
    }

    fn read_content_from_file(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(DocsError::validation(format!(
                "Not a readable file: {}",
                path.display()
            )));
        }
        read_to_string(path).map_err(DocsError::Io)
    }

    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".html").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;
            writeln!(file, "{} editing {} -->", EDITOR_MARKER, title)?;
            writeln!(
                file,
                "{} lines starting with this marker are dropped. Save and exit when done. -->",
                EDITOR_MARKER
            )?;
            write!(file, "{}", existing_content)?;
        }

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to edit document content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(process_editor_content(&content))
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let args = split(editor_cmd).map_err(|e| DocsError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(DocsError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        debug!("Launching editor: {} {:?}", program, rest);
        let status = Command::new(program)
            .args(rest)
            .arg(file_path)
            .status()
            .map_err(|e| DocsError::EditorError {
                message: format!("Failed to execute editor command '{}': {}", program, e),
            })?;

        if !status.success() {
            return Err(DocsError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    async fn handle_delete(&self, id: DocumentId, force: bool, missing_ok: bool) -> Result<()> {
        let doc = match self.store.get_by_id(id).await {
            Ok(doc) => doc,
            Err(DocsError::NotFound { .. }) if missing_ok => {
                println!("Document {} does not exist, nothing to delete.", id);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if !force {
            println!("You are about to delete the following document:");
            println!("ID:      {}", doc.id);
            println!("Title:   {}", doc.title);
            println!("Type:    {}", doc.doc_type);
            println!("Created: {}", doc.created.format("%Y-%m-%d %H:%M:%S"));
            println!("\nThis action cannot be undone!");
            print!("Are you sure you want to delete this document? [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;
            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        if missing_ok {
            self.store.delete_if_exists(id).await?;
        } else {
            self.store.delete(id).await?;
        }
        println!(
            "Document '{}' ({}) has been permanently deleted.",
            doc.title, doc.id
        );
        Ok(())
    }

    fn handle_config(&self, reset: bool) -> Result<()> {
        if reset {
            let path = self.config_path.clone().ok_or_else(|| DocsError::ConfigError {
                message: "No configuration path available".to_string(),
            })?;
            Config::default().save(&path)?;
            println!("Configuration reset: {}", path.display());
            return Ok(());
        }

        if let Some(path) = &self.config_path {
            println!("# {}", path.display());
        }
        println!("{}", serde_json::to_string_pretty(&self.config)?);
        Ok(())
    }
}

fn styled_type(doc_type: &DocumentType) -> console::StyledObject<&'static str> {
    let label = style(doc_type.label());
    match type_color(doc_type) {
        "green" => label.green(),
        "orange" => label.yellow(),
        "purple" => label.magenta(),
        "red" => label.red(),
        _ => label.blue(),
    }
}

/// Drops the comment lines the editor template adds.
fn process_editor_content(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with(EDITOR_MARKER))
        .collect::<Vec<&str>>()
        .join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}
