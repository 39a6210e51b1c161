//! Alert fragments swapped into the fixed alert container via htmx
//! out-of-band swaps.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const SUCCESS_ALERT_STYLE: &str = "p-4 text-sm rounded-lg shadow text-green-800 \
    bg-green-100 dark:bg-gray-800 dark:text-green-400";

const ERROR_ALERT_STYLE: &str = "p-4 text-sm rounded-lg shadow text-red-800 \
    bg-red-100 dark:bg-gray-800 dark:text-red-400";

/// A notification rendered into the alert container at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A green notification with a short message.
    SuccessSimple {
        /// The text shown in the alert.
        message: String,
    },
    /// A red notification with a bolded title and a detailed message.
    Error {
        /// A short summary of what failed.
        title: String,
        /// What went wrong and what to try instead.
        message: String,
    },
}

impl Alert {
    /// Create an error alert with a `title` and a detailed `message`.
    pub fn error(title: &str, message: &str) -> Self {
        Self::Error {
            title: title.to_owned(),
            message: message.to_owned(),
        }
    }

    /// Render the alert as an out-of-band swap targeting the alert container
    /// rendered by [base](crate::html::base).
    pub fn into_html(self) -> Markup {
        let body = match self {
            Alert::SuccessSimple { message } => html! {
                div class=(SUCCESS_ALERT_STYLE) role="alert"
                {
                    p { (message) }
                }
            },
            Alert::Error { title, message } => html! {
                div class=(ERROR_ALERT_STYLE) role="alert"
                {
                    p class="font-medium" { (title) }
                    p { (message) }
                }
            },
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                (body)
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
