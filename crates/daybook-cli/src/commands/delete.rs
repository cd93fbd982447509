use crate::commands::common::{resolve_entry, Context};
use crate::error::CliError;

pub async fn run_delete(ctx: &Context, id: &str) -> Result<(), CliError> {
    let entry = resolve_entry(ctx, id).await?;
    ctx.journal.delete_entry(&ctx.user, &entry.id).await?;
    println!("{}", entry.id);
    Ok(())
}
