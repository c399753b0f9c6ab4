// src/application/todos.rs
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::application::Backend;
use crate::domain::document::{decode_all, to_fields};
use crate::domain::query::CREATED_AT;
use crate::domain::{
    Collection, DomainError, NewTodo, Priority, Query, Todo, TodoFilter, User, ValidationErrors,
};
use crate::ports::Notifier;

/// Fields of the "add to-do" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// The signed-in user's to-do list.
pub struct TodoList<B: Backend> {
    backend: B,
    user_id: String,
    todos: Vec<Todo>,
    filter: TodoFilter,
    notifier: Notifier,
}

impl<B: Backend> TodoList<B> {
    pub fn new(backend: B, user: &User) -> Self {
        Self {
            backend,
            user_id: user.id.clone(),
            todos: Vec::new(),
            filter: TodoFilter::All,
            notifier: Notifier::new(),
        }
    }

    #[instrument(level = "debug", skip(self), fields(user_id = %self.user_id))]
    pub fn load(&mut self) {
        let queries = [
            Query::equal("userId", self.user_id.as_str()),
            Query::order_desc(CREATED_AT),
        ];
        match self.backend.list_documents(Collection::Todos, &queries) {
            Ok(documents) => self.todos = decode_all(&documents),
            Err(e) => {
                debug!(error = %e, "Loading todos failed");
                self.notifier.error("Failed to load todos");
            }
        }
    }

    pub fn add(&mut self, form: TodoForm) -> Result<&Todo, DomainError> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &form.title, "Title is required");
        errors.into_result()?;

        let payload = NewTodo {
            title: form.title,
            description: form.description,
            priority: form.priority.unwrap_or_default(),
            due_date: form.due_date,
            completed: false,
            user_id: self.user_id.clone(),
        };

        let created = self
            .backend
            .create_document(Collection::Todos, to_fields(&payload)?)
            .map_err(DomainError::from)
            .and_then(|doc| doc.decode::<Todo>());

        match created {
            Ok(todo) => {
                self.todos.insert(0, todo);
                self.notifier.success("Todo added successfully!");
                Ok(&self.todos[0])
            }
            Err(e) => {
                self.notifier.error("Failed to add todo");
                Err(e)
            }
        }
    }

    /// Flips completion of a todo; the local copy changes only after the write succeeds.
    pub fn toggle(&mut self, todo_id: &str) -> Result<bool, DomainError> {
        let current = self
            .todos
            .iter()
            .find(|t| t.id == todo_id)
            .map(|t| t.completed)
            .ok_or_else(|| DomainError::TodoNotFound(todo_id.to_string()))?;

        let mut fields = serde_json::Map::new();
        fields.insert("completed".to_string(), (!current).into());

        match self.backend.update_document(Collection::Todos, todo_id, fields) {
            Ok(_) => {
                if let Some(todo) = self.todos.iter_mut().find(|t| t.id == todo_id) {
                    todo.completed = !current;
                }
                self.notifier.success(if current {
                    "Todo marked as pending"
                } else {
                    "Todo completed!"
                });
                Ok(!current)
            }
            Err(e) => {
                self.notifier.error("Failed to update todo");
                Err(e.into())
            }
        }
    }

    pub fn delete(&mut self, todo_id: &str) -> Result<(), DomainError> {
        match self.backend.delete_document(Collection::Todos, todo_id) {
            Ok(()) => {
                self.todos.retain(|t| t.id != todo_id);
                self.notifier.success("Todo deleted successfully!");
                Ok(())
            }
            Err(e) => {
                self.notifier.error("Failed to delete todo");
                Err(e.into())
            }
        }
    }

    pub fn set_filter(&mut self, filter: TodoFilter) {
        self.filter = filter;
    }

    /// Todos passing the current completion filter.
    pub fn visible(&self) -> Vec<&Todo> {
        self.todos.iter().filter(|t| self.filter.matches(t)).collect()
    }

    pub fn all(&self) -> &[Todo] {
        &self.todos
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}
