use crate::config::Config;
use crate::render;
use crate::shell::{ShellAction, ShellState, reduce, search_route};

pub fn cmd_nav(
    config: &Config,
    path: &str,
    toggle_theme: bool,
    toggle_sidebar: bool,
    search: Option<&str>,
) {
    let mut state = ShellState {
        theme: config.shell.theme,
        sidebar: config.shell.sidebar,
    };

    if toggle_theme {
        state = reduce(state, ShellAction::ToggleTheme);
    }
    if toggle_sidebar {
        state = reduce(state, ShellAction::ToggleSidebar);
    }

    println!("ANIKII");
    print!("{}", render::sidebar(state, path));

    if let Some(term) = search {
        match search_route(term) {
            Some(route) => println!("\nSearch: {route}"),
            None => println!("\nSearch term is empty"),
        }
    }
}
