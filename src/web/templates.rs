//! Page templates compiled into the binary.

use super::WebError;
use axum::response::Html;
use minijinja::{Environment, Value};

macro_rules! template_sources {
    ($($name:literal),* $(,)?) => {
        &[$(($name, include_str!(concat!("../../templates/", $name)))),*]
    };
}

const SOURCES: &[(&str, &str)] = template_sources!(
    "base.html",
    "partials/pagination.html",
    "partials/task_table.html",
    "auth/login.html",
    "auth/register.html",
    "dashboard.html",
    "tasks/list.html",
    "tasks/mine.html",
    "tasks/detail.html",
    "tasks/form.html",
    "comments/form.html",
    "projects/list.html",
    "projects/detail.html",
    "projects/form.html",
    "teams/list.html",
    "teams/detail.html",
    "teams/form.html",
    "tags/list.html",
    "tags/detail.html",
    "notifications/list.html",
    "positions/list.html",
    "workers/list.html",
    "workers/form.html",
    "admin/notifications.html",
    "admin/activity.html",
    "admin/task_types.html",
    "name_form.html",
    "confirm_delete.html",
);

/// The template environment.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Parses every bundled template.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error.
    pub fn load() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in SOURCES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Renders `name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Internal`] when the template is missing or fails.
    pub fn render(&self, name: &str, context: Value) -> Result<Html<String>, WebError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(context))
            .map(Html)
            .map_err(WebError::internal)
    }
}

#[cfg(test)]
mod tests {
    use super::{SOURCES, Templates};

    #[test]
    fn every_bundled_template_parses() {
        let templates = Templates::load().expect("templates parse");
        for (name, _) in SOURCES {
            assert!(templates.env.get_template(name).is_ok(), "{name} missing");
        }
    }
}
