use marktree::config::Config;
use marktree::error::Result;

pub struct AppContext<'a> {
    pub config: &'a Config,
}

pub mod convert;

pub trait MarktreeCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()>;
}
