//! Collapsible tag groups for the create and edit forms.

use crate::models::{TagCategory, TagId};
use crate::state::AppState;
use crate::util::dom::{
    alert, as_html, document, on_click, query_all, set_class, ACCORDION_BOUND_ATTR,
    ACCORDION_HEADER, ACTIVE_CLASS, CREATE_ACCORDION_ID,
};
use crate::util::{escape_html, log_error};
use std::collections::BTreeSet;
use std::fmt::Write;
use web_sys::Element;

/// Markup for every category as one collapsed group of tag checkboxes.
///
/// Output depends only on the arguments, so it can be regenerated into a
/// panel at any time.
pub(crate) fn generate_accordion_html(
    categories: &[TagCategory],
    selected: &BTreeSet<TagId>,
) -> String {
    let mut html = String::new();

    for category in categories {
        let _ = write!(
            html,
            r#"<div class="accordion-item"><button type="button" class="accordion-header">{}</button><div class="accordion-content"><div class="tag-options">"#,
            escape_html(&category.category_name)
        );

        for tag in &category.tags {
            let checked = if selected.contains(&tag.id) {
                " checked"
            } else {
                ""
            };
            let _ = write!(
                html,
                r#"<label class="tag-option"><input type="checkbox" name="tags" value="{}"{checked}> {}</label>"#,
                tag.id,
                escape_html(&tag.name)
            );
        }

        html.push_str("</div></div></div>");
    }

    html
}

/// Flip one header's panel between collapsed (no max-height) and expanded
/// (max-height = natural content height).
pub(crate) fn toggle_panel(header: &Element) {
    let Some(panel) = header.next_element_sibling().and_then(|p| as_html(&p)) else {
        return;
    };

    let style = panel.style();
    let expanded = !style
        .get_property_value("max-height")
        .unwrap_or_default()
        .is_empty();

    if expanded {
        let _ = style.remove_property("max-height");
    } else {
        let _ = style.set_property("max-height", &format!("{}px", panel.scroll_height()));
    }
    set_class(header, ACTIVE_CLASS, !expanded);
}

/// Wire every header under `root` that is not wired yet. Returns how many
/// were newly bound.
pub(crate) fn bind_accordions(root: &Element) -> usize {
    let mut bound = 0;

    for header in query_all(root, ACCORDION_HEADER) {
        if header.has_attribute(ACCORDION_BOUND_ATTR) {
            continue;
        }

        let el = header.clone();
        match on_click(&header, move |_| toggle_panel(&el)) {
            Ok(()) => {
                let _ = header.set_attribute(ACCORDION_BOUND_ATTR, "1");
                bound += 1;
            }
            Err(e) => log_error("accordion", format!("bind failed: {e:?}")),
        }
    }

    bound
}

pub(crate) fn bind_accordions_in_document() -> usize {
    document()
        .and_then(|d| d.document_element())
        .map(|root| bind_accordions(&root))
        .unwrap_or(0)
}

/// Fill the create form's `data-source="api"` placeholder from the taxonomy.
pub(crate) async fn render_create_accordion(state: AppState) {
    let Some(target) = document().and_then(|d| d.get_element_by_id(CREATE_ACCORDION_ID)) else {
        return;
    };
    if target.get_attribute("data-source").as_deref() != Some("api") {
        return;
    }

    match state.taxonomy.get_or_fetch(&state.api).await {
        Ok(categories) => {
            target.set_inner_html(&generate_accordion_html(&categories, &BTreeSet::new()));
            bind_accordions(&target);
        }
        Err(e) => {
            log_error("accordion", format!("taxonomy fetch failed: {e}"));
            alert("Failed to load tags.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;

    fn taxonomy() -> Vec<TagCategory> {
        vec![
            TagCategory {
                category_name: "Model".to_string(),
                tags: vec![
                    Tag { id: 1, name: "GPT".to_string() },
                    Tag { id: 3, name: "Claude".to_string() },
                ],
            },
            TagCategory {
                category_name: "Use <case>".to_string(),
                tags: vec![
                    Tag { id: 7, name: "Code & review".to_string() },
                    Tag { id: 9, name: "Writing".to_string() },
                ],
            },
        ]
    }

    #[test]
    fn test_one_group_per_category_one_checkbox_per_tag() {
        let html = generate_accordion_html(&taxonomy(), &BTreeSet::new());
        assert_eq!(html.matches(r#"class="accordion-item""#).count(), 2);
        assert_eq!(html.matches(r#"class="accordion-header""#).count(), 2);
        assert_eq!(html.matches(r#"type="checkbox""#).count(), 4);
        assert!(!html.contains("checked"));
    }

    #[test]
    fn test_selected_ids_are_prechecked() {
        let selected: BTreeSet<TagId> = [3, 7].into_iter().collect();
        let html = generate_accordion_html(&taxonomy(), &selected);

        assert!(html.contains(r#"value="3" checked>"#));
        assert!(html.contains(r#"value="7" checked>"#));
        assert!(html.contains(r#"value="1">"#));
        assert!(html.contains(r#"value="9">"#));
        assert_eq!(html.matches(" checked").count(), 2);
    }

    #[test]
    fn test_unknown_selected_ids_are_ignored() {
        let selected: BTreeSet<TagId> = [42].into_iter().collect();
        let html = generate_accordion_html(&taxonomy(), &selected);
        assert_eq!(html.matches(" checked").count(), 0);
    }

    #[test]
    fn test_names_are_escaped() {
        let html = generate_accordion_html(&taxonomy(), &BTreeSet::new());
        assert!(html.contains("Use &lt;case&gt;"));
        assert!(html.contains("Code &amp; review"));
    }

    #[test]
    fn test_regeneration_is_deterministic() {
        let selected: BTreeSet<TagId> = [1].into_iter().collect();
        assert_eq!(
            generate_accordion_html(&taxonomy(), &selected),
            generate_accordion_html(&taxonomy(), &selected)
        );
        assert_eq!(generate_accordion_html(&[], &selected), "");
    }
}
