use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = lumi_api::Args::parse();

	lumi_api::run(args).await
}
