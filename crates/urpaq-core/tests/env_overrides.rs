//! Environment overrides mutate process state, so they live in their own
//! test binary with a single test.

use std::{env, fs};

use tempfile::TempDir;

use urpaq_core::config::Config;

#[test]
fn app_variables_and_dotenv_override_config_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[rag]\ntop_k = 3\n[s3]\nbucket = \"from-file\"\n[llm]\nmodel = \"file-model\"\n",
    )
    .unwrap();

    env::set_var("APP_S3__BUCKET", "palace-docs");
    env::set_var("APP_RAG__TOP_K", "7");
    let settings = Config::load_for_env("test", tmp.path()).unwrap().settings().unwrap();
    assert_eq!(settings.s3.bucket, "palace-docs");
    assert_eq!(settings.rag.top_k, 7);
    assert_eq!(settings.llm.model, "file-model");

    fs::write(tmp.path().join(".env"), "APP_LLM__MODEL=dotenv-model\nAPP_S3__BUCKET=ignored\n").unwrap();
    env::remove_var("RUST_ENV");
    env::set_current_dir(tmp.path()).unwrap();
    let settings = Config::load().unwrap().settings().unwrap();
    assert_eq!(settings.llm.model, "dotenv-model");
    // variables already in the environment win over .env
    assert_eq!(settings.s3.bucket, "palace-docs");
    assert_eq!(settings.rag.top_k, 7);

    env::remove_var("APP_S3__BUCKET");
    env::remove_var("APP_RAG__TOP_K");
    env::remove_var("APP_LLM__MODEL");
}
