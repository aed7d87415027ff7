mod command;
mod labels;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
