use crate::{
    admin, auth,
    auth::AuthError,
    config::Config,
    repo::{UserPatch, UserRepo},
    store::FileStore,
    user::{Role, User},
    Args,
};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::path::PathBuf;

pub struct Context {
    pub args: Args,
    pub config: Config,
    pub data_dir: PathBuf,
    pub repo: UserRepo<FileStore>,
    pub show_password: RefCell<bool>,
}

/// What a dashboard loop ended with
enum Exit {
    /// Session cleared, fall back to the sign-in form
    Logout,
    /// Quit the application
    Quit,
}

pub fn run(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history_path = ctx.data_dir.join("history.txt");
    if ctx.config.history {
        let _ = rl.load_history(&history_path);
    }

    loop {
        // Session slot first: an existing snapshot bypasses the form.
        let user = match ctx.repo.current_user() {
            Some(user) => user,
            None => match sign_in_form(&ctx, &mut rl)? {
                Some(user) => user,
                None => break,
            },
        };

        let exit = match user.role {
            Role::Admin => admin_dashboard(&ctx, &mut rl, &user)?,
            Role::User => user_dashboard(&ctx, &mut rl, &user)?,
        };
        match exit {
            Exit::Logout => continue,
            Exit::Quit => break,
        }
    }

    if ctx.config.history {
        let _ = rl.save_history(&history_path);
    }
    Ok(())
}

/// Read one trimmed line. `None` means Ctrl-C/Ctrl-D.
fn prompt(rl: &mut DefaultEditor, label: &str) -> Result<Option<String>> {
    match rl.readline(label) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The sign-in / registration form.
///
/// Returns the authenticated user, or `None` when the user quit. Switching
/// between sign-in and registration restarts the form with cleared fields,
/// which also drops any pending error message.
fn sign_in_form(ctx: &Context, rl: &mut DefaultEditor) -> Result<Option<User>> {
    let mut register = false;

    println!("userdesk - type /register to create an account, /exit to quit");
    println!("Default accounts: admin / admin123, user / user123");

    loop {
        let heading = if register { "register" } else { "sign in" };
        let username = match prompt(rl, &format!("[{}] username: ", heading))? {
            Some(line) => line,
            None => return Ok(None),
        };

        // Form commands are accepted in place of a username.
        if username.starts_with('/') {
            match username.as_str() {
                "/exit" | "/quit" => return Ok(None),
                "/register" => {
                    register = true;
                    continue;
                }
                "/login" => {
                    register = false;
                    continue;
                }
                "/help" => {
                    println!("Commands:");
                    println!("  /register  - switch to account creation");
                    println!("  /login     - switch back to sign in");
                    println!("  /exit      - quit");
                    continue;
                }
                _ => {
                    println!("Unknown command: {}", username);
                    continue;
                }
            }
        }

        let password = match prompt(rl, "password: ")? {
            Some(line) => line,
            None => return Ok(None),
        };

        let outcome = if register {
            let role = match prompt(rl, "role (admin/user) [user]: ")? {
                Some(line) if line.is_empty() => Role::User,
                Some(line) => match Role::from_str(&line) {
                    Some(role) => role,
                    None => {
                        println!("Unknown role: {}. Use admin or user.", line);
                        continue;
                    }
                },
                None => return Ok(None),
            };
            auth::register(&ctx.repo, &username, &password, role)?
        } else {
            auth::login(&ctx.repo, &username, &password)?
        };

        match outcome {
            Ok(user) => {
                ctx.repo.set_current_user(&user)?;
                println!("Welcome, {}!", user.username);
                return Ok(Some(user));
            }
            Err(e) => {
                // Inline error, form stays up.
                println!("{}", e);
            }
        }
    }
}

fn admin_dashboard(ctx: &Context, rl: &mut DefaultEditor, user: &User) -> Result<Exit> {
    println!(
        "Admin dashboard - signed in as {}. Type /help for commands.",
        user.username
    );
    print_stats(ctx);

    loop {
        match rl.readline("admin> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if let Some(exit) = handle_admin_command(ctx, rl, user, line)? {
                    return Ok(exit);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(Exit::Quit),
            Err(e) => {
                eprintln!("Input error: {}", e);
                return Ok(Exit::Quit);
            }
        }
    }
}

/// Dispatch one admin command. `Some(exit)` ends the dashboard loop.
fn handle_admin_command(
    ctx: &Context,
    rl: &mut DefaultEditor,
    user: &User,
    cmd: &str,
) -> Result<Option<Exit>> {
    let parts: Vec<&str> = cmd.splitn(2, ' ').collect();
    match parts[0] {
        "/exit" | "/quit" => return Ok(Some(Exit::Quit)),
        "/logout" => {
            ctx.repo.clear_current_user()?;
            println!("Signed out");
            return Ok(Some(Exit::Logout));
        }
        "/help" => {
            println!("Commands:");
            println!("  /list [term]    - list users, optionally filtered");
            println!("  /add            - add a user");
            println!("  /edit <id>      - edit a user");
            println!("  /delete <id>    - delete a user (asks for confirmation)");
            println!("  /stats          - show role counts");
            println!("  /whoami         - show the signed-in identity");
            println!("  /show           - toggle password display in the table");
            println!("  /logout         - sign out and return to the form");
            println!("  /exit           - quit");
        }
        "/list" => {
            let term = if parts.len() > 1 { parts[1].trim() } else { "" };
            let users = ctx.repo.list();
            let filtered = admin::filter_users(&users, term);
            print_table(ctx, &filtered);
        }
        "/add" => handle_add(ctx, rl)?,
        "/edit" => {
            if let Some(id) = parse_id(parts.get(1).copied()) {
                handle_edit(ctx, rl, id)?;
            }
        }
        "/delete" => {
            if let Some(id) = parse_id(parts.get(1).copied()) {
                handle_delete(ctx, rl, user, id)?;
            }
        }
        "/stats" => print_stats(ctx),
        "/whoami" => print_identity(ctx, user),
        "/show" => {
            let mut show = ctx.show_password.borrow_mut();
            *show = !*show;
            println!("Password display: {}", if *show { "on" } else { "off" });
        }
        _ => println!("Unknown command: {}", parts[0]),
    }
    Ok(None)
}

fn user_dashboard(ctx: &Context, rl: &mut DefaultEditor, user: &User) -> Result<Exit> {
    println!(
        "Signed in as {} ({}). Type /help for commands.",
        user.username, user.role
    );

    loop {
        match rl.readline(">>> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match line {
                    "/exit" | "/quit" => return Ok(Exit::Quit),
                    "/logout" => {
                        ctx.repo.clear_current_user()?;
                        println!("Signed out");
                        return Ok(Exit::Logout);
                    }
                    "/whoami" => print_identity(ctx, user),
                    "/help" => {
                        println!("Commands:");
                        println!("  /whoami  - show the signed-in identity");
                        println!("  /logout  - sign out and return to the form");
                        println!("  /exit    - quit");
                    }
                    _ => println!("Unknown command: {}", line),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(Exit::Quit),
            Err(e) => {
                eprintln!("Input error: {}", e);
                return Ok(Exit::Quit);
            }
        }
    }
}

fn handle_add(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    let Some(username) = prompt(rl, "username: ")? else {
        return Ok(());
    };
    let Some(password) = prompt(rl, "password: ")? else {
        return Ok(());
    };
    if username.is_empty() || password.is_empty() {
        println!("{}", AuthError::MissingFields);
        return Ok(());
    }
    let role = match prompt(rl, "role (admin/user) [user]: ")? {
        Some(line) if line.is_empty() => Role::User,
        Some(line) => match Role::from_str(&line) {
            Some(role) => role,
            None => {
                println!("Unknown role: {}. Use admin or user.", line);
                return Ok(());
            }
        },
        None => return Ok(()),
    };

    // Same as the original add path: no username conflict check here.
    let user = ctx.repo.create(&username, &password, role)?;
    println!("Added {} ({}) with id {}", user.username, user.role, user.id);
    debug_store_size(ctx);
    Ok(())
}

fn handle_edit(ctx: &Context, rl: &mut DefaultEditor, id: i64) -> Result<()> {
    let Some(existing) = ctx.repo.find(id) else {
        println!("No user with id {}", id);
        return Ok(());
    };

    // Empty input keeps the stored value.
    let Some(username) = prompt(rl, &format!("username [{}]: ", existing.username))? else {
        return Ok(());
    };
    let Some(password) = prompt(rl, "password [keep current]: ")? else {
        return Ok(());
    };
    let Some(role_line) = prompt(rl, &format!("role (admin/user) [{}]: ", existing.role))? else {
        return Ok(());
    };
    let role = if role_line.is_empty() {
        None
    } else {
        match Role::from_str(&role_line) {
            Some(role) => Some(role),
            None => {
                println!("Unknown role: {}. Use admin or user.", role_line);
                return Ok(());
            }
        }
    };

    let patch = UserPatch {
        username: (!username.is_empty()).then_some(username),
        password: (!password.is_empty()).then_some(password),
        role,
    };
    match ctx.repo.update(id, &patch)? {
        Some(updated) => println!("Updated {} ({})", updated.username, updated.role),
        None => println!("No user with id {}", id),
    }
    Ok(())
}

fn handle_delete(ctx: &Context, rl: &mut DefaultEditor, user: &User, id: i64) -> Result<()> {
    if let Err(e) = admin::check_delete(id, user.id) {
        println!("{}", e);
        return Ok(());
    }
    let Some(target) = ctx.repo.find(id) else {
        println!("No user with id {}", id);
        return Ok(());
    };

    let confirm = prompt(rl, &format!("Delete user '{}'? [y/N]: ", target.username))?;
    match confirm.as_deref() {
        Some("y") | Some("yes") | Some("Y") => {
            if ctx.repo.delete(id)? {
                println!("Deleted {}", target.username);
                debug_store_size(ctx);
            }
        }
        _ => println!("Cancelled"),
    }
    Ok(())
}

fn parse_id(arg: Option<&str>) -> Option<i64> {
    let Some(arg) = arg.map(str::trim).filter(|s| !s.is_empty()) else {
        println!("Usage: /edit <id> or /delete <id>");
        return None;
    };
    match arg.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("Invalid id: {}", arg);
            None
        }
    }
}

fn print_stats(ctx: &Context) {
    let users = ctx.repo.list();
    let counts = admin::role_counts(&users);
    println!(
        "Users: {} total, {} admin, {} regular",
        counts.total, counts.admins, counts.users
    );
}

fn print_identity(ctx: &Context, user: &User) {
    println!("Username: {}", user.username);
    println!("Role:     {}", user.role);
    println!("Id:       {}", user.id);
    println!(
        "Created:  {}",
        user.created_at.format(&ctx.config.date_format)
    );
}

fn print_table(ctx: &Context, users: &[&User]) {
    if users.is_empty() {
        println!("No users found");
        return;
    }
    let show = *ctx.show_password.borrow();
    println!(
        "{:<15} {:<16} {:<16} {:<7} {}",
        "ID", "USERNAME", "PASSWORD", "ROLE", "CREATED"
    );
    for user in users {
        let password = if show {
            user.password.clone()
        } else {
            "*".repeat(user.password.len().min(12))
        };
        println!(
            "{:<15} {:<16} {:<16} {:<7} {}",
            user.id,
            user.username,
            password,
            user.role,
            user.created_at.format(&ctx.config.date_format)
        );
    }
}

fn debug_store_size(ctx: &Context) {
    if ctx.args.debug {
        eprintln!("[DEBUG] Store now holds {} records", ctx.repo.list().len());
    }
}
