//! The blogo subcommands.

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{error, info};

use super::{handler, logged_in, AppContext, Command, CommandRegistry};
use crate::aggregator::{parse_interval, Aggregator};
use crate::db::{User, UserRepository};
use crate::feed::{FeedFollowRepository, FeedRepository, NewFeed};
use crate::post::PostRepository;
use crate::rss::HttpFeedSource;
use crate::{BlogoError, Result};

/// Maximum description length shown by `browse`.
const BROWSE_DESCRIPTION_CHARS: usize = 100;

/// Register every blogo command.
pub fn register_all_commands(registry: &mut CommandRegistry) {
    registry.register("register", handler(handle_register));
    registry.register("login", handler(handle_login));
    registry.register("users", handler(handle_users));
    registry.register("reset", handler(handle_reset));
    registry.register("agg", handler(handle_agg));
    registry.register("feeds", handler(handle_feeds));
    registry.register("addfeed", logged_in(handle_addfeed));
    registry.register("follow", logged_in(handle_follow));
    registry.register("following", logged_in(handle_following));
    registry.register("unfollow", logged_in(handle_unfollow));
    registry.register("browse", logged_in(handle_browse));
}

/// Shorten `s` to at most `max` characters, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((end, _)) => format!("{}…", &s[..end]),
        None => s.to_string(),
    }
}

fn handle_register<'a>(ctx: &'a mut AppContext, cmd: &'a Command) -> BoxFuture<'a, Result<()>> {
    async move {
        cmd.require_args(1, "register <name>")?;
        let name = &cmd.args[0];

        let user = UserRepository::new(ctx.db.pool()).create(name).await?;
        ctx.config.set_current_user(&user.name);
        ctx.save_session()?;

        info!("Registered user {} (id {})", user.name, user.id);
        println!("Registered user: {}", user.name);
        Ok(())
    }
    .boxed()
}

fn handle_login<'a>(ctx: &'a mut AppContext, cmd: &'a Command) -> BoxFuture<'a, Result<()>> {
    async move {
        cmd.require_args(1, "login <name>")?;
        let name = &cmd.args[0];

        if !UserRepository::new(ctx.db.pool()).exists(name).await? {
            return Err(BlogoError::Auth(format!("user \"{name}\" is not registered")));
        }
        ctx.config.set_current_user(name.as_str());
        ctx.save_session()?;

        println!("Logged in as {name}");
        Ok(())
    }
    .boxed()
}

fn handle_users<'a>(ctx: &'a mut AppContext, _cmd: &'a Command) -> BoxFuture<'a, Result<()>> {
    async move {
        let users = UserRepository::new(ctx.db.pool()).list_all().await?;
        if users.is_empty() {
            println!("No users registered.");
        }
        for user in users {
            if ctx.config.current_user() == Some(user.name.as_str()) {
                println!("* {} (current)", user.name);
            } else {
                println!("* {}", user.name);
            }
        }
        Ok(())
    }
    .boxed()
}

fn handle_reset<'a>(ctx: &'a mut AppContext, _cmd: &'a Command) -> BoxFuture<'a, Result<()>> {
    async move {
        ctx.db.reset().await?;
        println!("Database has been reset.");
        Ok(())
    }
    .boxed()
}

fn handle_agg<'a>(ctx: &'a mut AppContext, cmd: &'a Command) -> BoxFuture<'a, Result<()>> {
    async move {
        cmd.require_args(1, "agg <interval>")?;
        let interval = parse_interval(&cmd.args[0])?;

        let source = HttpFeedSource::new(&ctx.config.aggregator)?;
        let aggregator = Aggregator::new(ctx.db.clone(), source);

        println!("Collecting feeds every {}", cmd.args[0]);
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        aggregator.run_until(interval, shutdown).await
    }
    .boxed()
}

fn handle_feeds<'a>(ctx: &'a mut AppContext, _cmd: &'a Command) -> BoxFuture<'a, Result<()>> {
    async move {
        let feeds = FeedRepository::new(ctx.db.pool()).list_with_owner().await?;
        if feeds.is_empty() {
            println!("No feeds found.");
            return Ok(());
        }
        for feed in feeds {
            println!("{} - {} (added by {})", feed.name, feed.url, feed.owner);
        }
        Ok(())
    }
    .boxed()
}

fn handle_addfeed<'a>(
    ctx: &'a mut AppContext,
    cmd: &'a Command,
    user: User,
) -> BoxFuture<'a, Result<()>> {
    async move {
        cmd.require_args(2, "addfeed <name> <url>")?;
        let (name, url) = (&cmd.args[0], &cmd.args[1]);

        let feed = FeedRepository::new(ctx.db.pool())
            .create(&NewFeed::new(name.as_str(), url.as_str(), user.id))
            .await?;
        println!("Feed added: {} - {}", feed.name, feed.url);

        let follow = FeedFollowRepository::new(ctx.db.pool())
            .create(user.id, feed.id)
            .await?;
        println!("{} is now following {}", follow.user_name, follow.feed_name);
        Ok(())
    }
    .boxed()
}

fn handle_follow<'a>(
    ctx: &'a mut AppContext,
    cmd: &'a Command,
    user: User,
) -> BoxFuture<'a, Result<()>> {
    async move {
        cmd.require_args(1, "follow <url>")?;
        let url = &cmd.args[0];

        let feed = FeedRepository::new(ctx.db.pool())
            .get_by_url(url)
            .await?
            .ok_or_else(|| BlogoError::NotFound(format!("feed \"{url}\"")))?;
        let follow = FeedFollowRepository::new(ctx.db.pool())
            .create(user.id, feed.id)
            .await?;

        println!("{} is now following {}", follow.user_name, follow.feed_name);
        Ok(())
    }
    .boxed()
}

fn handle_following<'a>(
    ctx: &'a mut AppContext,
    _cmd: &'a Command,
    user: User,
) -> BoxFuture<'a, Result<()>> {
    async move {
        let follows = FeedFollowRepository::new(ctx.db.pool())
            .list_for_user(user.id)
            .await?;
        if follows.is_empty() {
            println!("{} is not following any feeds.", user.name);
            return Ok(());
        }
        for follow in follows {
            println!("* {} ({})", follow.feed_name, follow.feed_url);
        }
        Ok(())
    }
    .boxed()
}

fn handle_unfollow<'a>(
    ctx: &'a mut AppContext,
    cmd: &'a Command,
    user: User,
) -> BoxFuture<'a, Result<()>> {
    async move {
        cmd.require_args(1, "unfollow <url>")?;
        let url = &cmd.args[0];

        FeedFollowRepository::new(ctx.db.pool())
            .delete_by_user_and_url(user.id, url)
            .await?;

        println!("{} unfollowed {}", user.name, url);
        Ok(())
    }
    .boxed()
}

fn handle_browse<'a>(
    ctx: &'a mut AppContext,
    cmd: &'a Command,
    user: User,
) -> BoxFuture<'a, Result<()>> {
    async move {
        let limit = match cmd.args.as_slice() {
            [] => ctx.config.aggregator.browse_limit,
            [arg] => arg
                .parse::<i64>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| {
                    BlogoError::Validation(format!("{}: invalid limit \"{}\"", cmd.name, arg))
                })?,
            _ => return Err(cmd.usage_error("browse [limit]")),
        };

        let posts = PostRepository::new(ctx.db.pool())
            .list_for_user(user.id, limit)
            .await?;
        if posts.is_empty() {
            println!("No posts available.");
            return Ok(());
        }

        for (i, post) in posts.iter().enumerate() {
            let published = post
                .published_at
                .map(|dt| dt.to_rfc2822())
                .unwrap_or_else(|| "unknown".to_string());
            println!("=== Post {} ===", i + 1);
            println!("{} ({})", post.title, post.url);
            println!("  published: {published}");
            if let Some(description) = &post.description {
                println!("  {}", truncate(description, BROWSE_DESCRIPTION_CHARS));
            }
            println!();
        }
        Ok(())
    }
    .boxed()
}
