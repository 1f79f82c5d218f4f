use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::corpus::{self, InputDoc};
use search_core::{
    log_duration, process_queries, process_queries_joined, remove_duplicates, Document,
    DocumentId, DocumentStatus, RequestQueue, SearchIndex,
};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Load documents into an in-memory TF-IDF index and query it", long_about = None)]
struct Cli {
    /// Input path (.json, .jsonl or a directory of them)
    #[arg(long, global = true, default_value = "./sample_data/docs.jsonl")]
    input: String,
    /// Space-separated stop words
    #[arg(long, global = true, default_value = "")]
    stop_words: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top documents for one query
    Search {
        #[arg(long)]
        query: String,
        /// Only documents with this status (actual, irrelevant, banned, removed)
        #[arg(long, default_value = "actual")]
        status: DocumentStatus,
    },
    /// Run every line of a file as a query, in parallel
    Batch {
        /// File with one query per line
        #[arg(long)]
        queries: String,
        /// Print one flat list instead of one list per query
        #[arg(long, default_value_t = false)]
        joined: bool,
    },
    /// Show which query terms a document matches
    Match {
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocumentId,
    },
    /// Print term frequencies of one document
    Frequencies {
        #[arg(long)]
        id: DocumentId,
    },
    /// Remove documents with the same set of words as an earlier one
    Dedupe,
    /// Replay queries and count how many came back empty
    Requests {
        #[arg(long)]
        queries: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let mut index = build_index(&cli.input, &cli.stop_words)?;
    match cli.command {
        Commands::Search { query, status } => {
            log_duration!("search");
            print_documents(&index.find_top_documents_by_status(&query, status)?);
        }
        Commands::Batch { queries, joined } => {
            let queries = read_queries(&queries)?;
            log_duration!("batch");
            if joined {
                print_documents(&process_queries_joined(&index, &queries)?);
            } else {
                for (query, documents) in queries.iter().zip(process_queries(&index, &queries)?) {
                    println!("Results for \"{query}\":");
                    print_documents(&documents);
                }
            }
        }
        Commands::Match { query, id } => {
            log_duration!("match");
            let (words, status) = index.match_document(&query, id)?;
            println!("{{ document_id = {id}, status = {status:?}, words = {} }}", words.join(" "));
        }
        Commands::Frequencies { id } => {
            log_duration!("frequencies");
            for (word, freq) in index.get_word_frequencies(id)? {
                println!("{word}: {freq}");
            }
        }
        Commands::Dedupe => {
            log_duration!("dedupe");
            for id in remove_duplicates(&mut index) {
                println!("Found duplicate document id {id}");
            }
            println!("Documents left: {}", index.document_count());
        }
        Commands::Requests { queries } => {
            let queries = read_queries(&queries)?;
            log_duration!("requests");
            let mut queue = RequestQueue::new(&index);
            for query in &queries {
                queue.add_find_request(query)?;
            }
            println!("Total empty requests: {}", queue.no_result_requests());
        }
    }
    Ok(())
}

fn build_index(input: &str, stop_words: &str) -> Result<SearchIndex> {
    log_duration!("build index");
    let docs: Vec<InputDoc> = corpus::load(input).with_context(|| format!("reading {input}"))?;
    let mut index = SearchIndex::with_stop_words_text(stop_words)?;
    corpus::index_all(&mut index, &docs)?;
    tracing::info!(num_docs = index.document_count(), "index ready");
    Ok(index)
}

fn read_queries(path: &str) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    Ok(text.lines().filter(|l| !l.trim().is_empty()).map(str::to_string).collect())
}

fn print_documents(documents: &[Document]) {
    for document in documents {
        println!("{document}");
    }
}
