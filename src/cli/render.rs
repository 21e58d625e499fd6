// Terminal output for a GitHub user snapshot: either JSON (the same shape that
// is cached in local storage) or a profile header followed by aligned tables.

use std::fmt::Write;

use anyhow::Result;

use crate::core::github::{Follower, Gist, GitUserData, Repo, User};

pub fn print_snapshot(data: &GitUserData, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        print!("{}", format_snapshot(data));
    }
    Ok(())
}

pub fn format_snapshot(data: &GitUserData) -> String {
    let mut out = String::new();

    match &data.user {
        Some(user) => format_profile(&mut out, user),
        None => out.push_str("No user loaded.\n"),
    }

    if let Some(followers) = &data.followers {
        format_followers(&mut out, followers);
    }
    if let Some(gists) = &data.gists {
        format_gists(&mut out, gists);
    }
    if let Some(repos) = &data.repositories {
        format_repos(&mut out, repos);
    }

    out
}

fn format_profile(out: &mut String, user: &User) {
    let _ = writeln!(out, "👤 {} (@{})", user.display_name(), user.login);
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        let _ = writeln!(out, "   {}", bio.trim());
    }
    for (label, value) in [
        ("Company", user.company.as_deref()),
        ("Location", user.location.as_deref()),
        ("Blog", user.blog.as_deref()),
        ("Email", user.email.as_deref()),
    ] {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            let _ = writeln!(out, "   {:<10} {}", label, value);
        }
    }
    let _ = writeln!(
        out,
        "   {} followers · {} following · {} public repos · {} public gists",
        user.followers, user.following, user.public_repos, user.public_gists
    );
    let _ = writeln!(
        out,
        "   {} · joined {}",
        user.html_url,
        user.created_at.format("%Y-%m-%d")
    );
}

fn format_followers(out: &mut String, followers: &[Follower]) {
    let _ = writeln!(out, "\n👥 Followers ({})", followers.len());
    if followers.is_empty() {
        return;
    }
    let _ = writeln!(out, "{:<30} {}", "LOGIN", "PROFILE");
    let _ = writeln!(out, "{}", "=".repeat(70));
    for follower in followers {
        let _ = writeln!(
            out,
            "{:<30} {}",
            truncate(&follower.login, 30),
            follower.html_url
        );
    }
}

fn format_gists(out: &mut String, gists: &[Gist]) {
    let _ = writeln!(out, "\n📝 Gists ({})", gists.len());
    if gists.is_empty() {
        return;
    }
    let _ = writeln!(out, "{:<40} {:<6} {:<12} {}", "DESCRIPTION", "FILES", "UPDATED", "URL");
    let _ = writeln!(out, "{}", "=".repeat(100));
    for gist in gists {
        let description = gist
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| gist.files.keys().next().map(String::as_str))
            .unwrap_or("(no description)");
        let _ = writeln!(
            out,
            "{:<40} {:<6} {:<12} {}",
            truncate(description, 40),
            gist.files.len(),
            gist.updated_at.format("%Y-%m-%d").to_string(),
            gist.html_url
        );
    }
}

fn format_repos(out: &mut String, repos: &[Repo]) {
    let _ = writeln!(out, "\n📦 Repositories ({})", repos.len());
    if repos.is_empty() {
        return;
    }
    let _ = writeln!(
        out,
        "{:<35} {:<14} {:>7} {:>7}  {}",
        "NAME", "LANGUAGE", "STARS", "FORKS", "DESCRIPTION"
    );
    let _ = writeln!(out, "{}", "=".repeat(110));
    for repo in repos {
        let name = if repo.fork {
            format!("{} (fork)", repo.name)
        } else {
            repo.name.clone()
        };
        let _ = writeln!(
            out,
            "{:<35} {:<14} {:>7} {:>7}  {}",
            truncate(&name, 35),
            truncate(repo.language.as_deref().unwrap_or("-"), 14),
            repo.stargazers_count,
            repo.forks_count,
            truncate(repo.description.as_deref().unwrap_or(""), 50)
        );
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut short: String = text.chars().take(keep).collect();
    short.push_str("...");
    short
}
