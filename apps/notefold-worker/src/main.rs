use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = notefold_worker::Args::parse();
	notefold_worker::run(args).await
}
