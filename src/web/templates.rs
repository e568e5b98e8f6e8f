use minijinja::{Environment, Value};
use rust_embed::RustEmbed;
use tracing::error;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateAssets;

/// Template environment that loads pages from the embedded `templates/` folder.
pub fn init_templates() -> Environment<'static> {
    let mut env = Environment::new();

    env.set_loader(|name| {
        Ok(TemplateAssets::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned()))
    });

    env
}

pub fn render_template(env: &Environment, template_name: &str, context: Value) -> String {
    match env.get_template(template_name) {
        Ok(tmpl) => match tmpl.render(context) {
            Ok(result) => result,
            Err(e) => {
                error!("Template render error: {}", e);
                format!("<h1>Template Error</h1><p>{}</p>", e)
            }
        },
        Err(e) => {
            error!("Template not found: {} ({})", template_name, e);
            format!("<h1>Template Not Found</h1><p>{}: {}</p>", template_name, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn embedded_pages_load() {
        let env = init_templates();
        for name in ["index.html", "saved.html", "edit.html"] {
            assert!(env.get_template(name).is_ok(), "{} should be embedded", name);
        }
    }

    #[test]
    fn saved_page_renders_rows() {
        let env = init_templates();
        let html = render_template(
            &env,
            "saved.html",
            context! {
                queries => vec![context! { id => 1, location_name => "Paris", lat => 48.8566, lon => 2.3522 }],
                filtered => false,
            },
        );
        assert!(!html.contains("Template Error"), "{}", html);
        assert!(html.contains("<td>Paris</td>"));
        assert!(html.contains("action=\"/delete/1\""));
    }

    #[test]
    fn missing_template_renders_an_error_page() {
        let env = init_templates();
        let html = render_template(&env, "nope.html", context! {});
        assert!(html.contains("Template Not Found"));
    }
}
