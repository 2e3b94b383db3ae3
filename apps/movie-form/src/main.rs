//! Fetches movie metadata by title and fills a flat form.
//!
//! Queries an OMDb-style API, prints the filled form and optionally
//! submits it as a urlencoded POST.

mod client;
mod form;

use anyhow::Context;
use clap::Parser;

use client::MovieClient;
use form::MovieForm;

/// Command-line arguments for the movie form utility.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Movie title to look up
    title: String,

    /// Base URL of the metadata API
    #[arg(long, default_value = "http://www.omdbapi.com/")]
    api_base: String,

    /// API key for the metadata API
    #[arg(long, default_value = "f02e43b0")]
    api_key: String,

    /// Endpoint to submit the filled form to
    #[arg(long)]
    submit_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let client = MovieClient::new(args.api_base, args.api_key);
    let payload = client
        .fetch(&args.title)
        .await
        .context("Failed to fetch movie metadata")?;
    let form = MovieForm::from(payload);

    println!("titulo:    {}", form.title);
    println!("anyo:      {}", form.year);
    println!("duracion:  {}", form.runtime);
    println!("pais:      {}", form.country);
    println!("imdb:      {}", form.imdb_id);
    println!("sinop:     {}", form.plot);
    println!("director:  {}", form.director);
    println!("productor: {}", form.production);
    println!("fecha:     {}", form.released);
    println!("guion:     {}", form.writer);
    println!("genero:    {}", form.genre);
    println!("portada:   {}", form.poster);

    if let Some(submit_url) = args.submit_url {
        let http = reqwest::Client::new();
        form.submit(&http, &submit_url)
            .await
            .context("Failed to submit the form")?;
        println!("Bien guardado");
    }

    Ok(())
}
