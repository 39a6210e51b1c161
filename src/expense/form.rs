use maud::{Markup, html};

use crate::html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE};

/// Initial values for the expense form fields.
///
/// The record date is not an input. New expenses are stamped with the
/// server's current date and edits leave the original date untouched.
pub struct ExpenseFormDefaults<'a> {
    pub amount: Option<f64>,
    pub category: Option<&'a str>,
    pub description: Option<&'a str>,
    pub autofocus_amount: bool,
}

pub fn expense_form_fields(defaults: &ExpenseFormDefaults<'_>) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));
    let amount_placeholder = amount_str.as_deref().unwrap_or("0.01");
    let category_placeholder = defaults.category.unwrap_or("e.g. groceries");
    let description_placeholder = defaults.description.unwrap_or("Description");

    html! {
        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder=(amount_placeholder)
                    min="0.01"
                    required
                    value=[amount_str.as_deref()]
                    autofocus[defaults.autofocus_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            input
                name="category"
                id="category"
                type="text"
                placeholder=(category_placeholder)
                value=[defaults.category]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder=(description_placeholder)
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::{ExpenseFormDefaults, expense_form_fields};

    #[test]
    fn expense_form_fields_mark_required_inputs() {
        let document = render_fields(None, None, None);

        assert_required(&document, "amount", true);
        assert_required(&document, "category", true);
        assert_required(&document, "description", false);
    }

    #[test]
    fn expense_form_fields_have_no_date_input() {
        let document = render_fields(None, None, None);

        let selector = Selector::parse("input[type=date]").unwrap();
        assert!(
            document.select(&selector).next().is_none(),
            "The record date is stamped on the server and should not be an input"
        );
    }

    #[test]
    fn expense_form_fields_prefill_defaults() {
        let document = render_fields(Some(12.5), Some("groceries"), Some("weekly shop"));

        assert_value(&document, "amount", "12.50");
        assert_value(&document, "category", "groceries");
        assert_value(&document, "description", "weekly shop");
    }

    fn render_fields(
        amount: Option<f64>,
        category: Option<&str>,
        description: Option<&str>,
    ) -> Html {
        let fields = expense_form_fields(&ExpenseFormDefaults {
            amount,
            category,
            description,
            autofocus_amount: false,
        });
        let markup = maud::html! { form { (fields) } };
        Html::parse_document(&markup.into_string())
    }

    #[track_caller]
    fn assert_required(document: &Html, input_name: &str, want_required: bool) {
        let selector = Selector::parse(&format!("input[name={input_name}]")).unwrap();
        let input = document
            .select(&selector)
            .next()
            .unwrap_or_else(|| panic!("could not find input named {input_name}"));

        assert_eq!(
            input.value().attr("required").is_some(),
            want_required,
            "want input {input_name} required attribute to be {want_required}"
        );
    }

    #[track_caller]
    fn assert_value(document: &Html, input_name: &str, want_value: &str) {
        let selector = Selector::parse(&format!("input[name={input_name}]")).unwrap();
        let input = document
            .select(&selector)
            .next()
            .unwrap_or_else(|| panic!("could not find input named {input_name}"));
        let value = input.value().attr("value");

        assert_eq!(
            value,
            Some(want_value),
            "want input {input_name} to have value {want_value}, got {value:?}"
        );
    }
}
