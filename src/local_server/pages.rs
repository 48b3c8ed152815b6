use askama::Template;
use axum::response::Html;
use tracing::warn;

#[derive(Template)]
#[template(path = "callback_success.html")]
pub(super) struct SuccessPage;

/// `error` is escaped by the template engine.
#[derive(Template)]
#[template(path = "callback_error.html")]
pub(super) struct ErrorPage<'a> {
    pub(super) error: &'a str,
}

pub(super) fn render<T: Template>(page: &T) -> Html<String> {
    match page.render() {
        Ok(html) => Html(html),
        Err(err) => {
            warn!(error = %err, "failed to render callback page");
            Html(String::new())
        }
    }
}
