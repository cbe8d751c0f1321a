use std::path::Path;
use std::sync::Mutex;

use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::query::{AllQuery, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

use urpaq_core::error::{Error, Result};
use urpaq_core::traits::DocumentStore;
use urpaq_core::types::{source_document_id, DocumentId, RetrievalDocument, SearchHit};

use crate::tantivy_utils::{build_schema, register_tokenizer};

const WRITER_HEAP_BYTES: usize = 50_000_000;

fn index_err(e: impl std::fmt::Display) -> Error {
	Error::Index(e.to_string())
}

pub struct TantivyDocumentStore {
	index: Index,
	reader: IndexReader,
	writer: Mutex<IndexWriter>,
	id_field: Field,
	source_field: Field,
	name_field: Field,
	text_field: Field,
}

impl TantivyDocumentStore {
	/// Open the index in `dir`, creating it (and the directory) when absent.
	pub fn open_or_create(dir: &Path) -> Result<Self> {
		std::fs::create_dir_all(dir)?;
		let directory = MmapDirectory::open(dir).map_err(index_err)?;
		let index = Index::open_or_create(directory, build_schema()).map_err(index_err)?;
		info!("Opened text index at {}", dir.display());
		Self::from_index(index)
	}

	pub fn in_memory() -> Result<Self> {
		Self::from_index(Index::create_in_ram(build_schema()))
	}

	fn from_index(index: Index) -> Result<Self> {
		register_tokenizer(&index);
		let schema = index.schema();
		let id_field = schema.get_field("id").map_err(index_err)?;
		let source_field = schema.get_field("source_id").map_err(index_err)?;
		let name_field = schema.get_field("name").map_err(index_err)?;
		let text_field = schema.get_field("text").map_err(index_err)?;
		let writer = index.writer_with_num_threads(1, WRITER_HEAP_BYTES).map_err(index_err)?;
		let reader = index
			.reader_builder()
			.reload_policy(ReloadPolicy::Manual)
			.try_into()
			.map_err(index_err)?;
		Ok(Self { index, reader, writer: Mutex::new(writer), id_field, source_field, name_field, text_field })
	}

	fn write<F>(&self, f: F) -> Result<()>
	where
		F: FnOnce(&mut IndexWriter) -> tantivy::Result<()>,
	{
		let mut writer = self.writer.lock().map_err(|_| Error::Index("index writer lock poisoned".into()))?;
		f(&mut writer).map_err(index_err)?;
		writer.commit().map_err(index_err)?;
		self.reader.reload().map_err(index_err)
	}

	fn add(&self, writer: &mut IndexWriter, document: &RetrievalDocument) -> tantivy::Result<()> {
		writer.delete_term(Term::from_field_text(self.id_field, &document.id));
		writer.add_document(doc!(
			self.id_field => document.id.clone(),
			self.source_field => source_document_id(&document.id).to_string(),
			self.name_field => document.name.clone(),
			self.text_field => document.text.clone(),
		))?;
		Ok(())
	}

	fn to_document(&self, doc: &TantivyDocument) -> RetrievalDocument {
		let field = |f: Field| doc.get_first(f).and_then(|v| v.as_str()).unwrap_or("").to_string();
		RetrievalDocument { id: field(self.id_field), name: field(self.name_field), text: field(self.text_field) }
	}
}

impl DocumentStore for TantivyDocumentStore {
	fn save(&self, document: &RetrievalDocument) -> Result<()> {
		self.write(|w| self.add(w, document))
	}

	fn save_many(&self, documents: &[RetrievalDocument]) -> Result<usize> {
		if documents.is_empty() {
			return Ok(0);
		}
		self.write(|w| documents.iter().try_for_each(|d| self.add(w, d)))?;
		debug!("Indexed {} documents", documents.len());
		Ok(documents.len())
	}

	fn replace_sources(&self, source_ids: &[DocumentId], documents: &[RetrievalDocument]) -> Result<usize> {
		self.write(|w| {
			for id in source_ids {
				w.delete_term(Term::from_field_text(self.source_field, id));
			}
			documents.iter().try_for_each(|d| self.add(w, d))
		})?;
		debug!("Replaced {} sources with {} entries", source_ids.len(), documents.len());
		Ok(documents.len())
	}

	fn find_by_id(&self, id: &str) -> Result<Option<RetrievalDocument>> {
		let searcher = self.reader.searcher();
		let query = TermQuery::new(Term::from_field_text(self.id_field, id), IndexRecordOption::Basic);
		let top = searcher.search(&query, &TopDocs::with_limit(1)).map_err(index_err)?;
		match top.first() {
			Some((_, addr)) => {
				let doc: TantivyDocument = searcher.doc(*addr).map_err(index_err)?;
				Ok(Some(self.to_document(&doc)))
			}
			None => Ok(None),
		}
	}

	fn find_all(&self) -> Result<Vec<RetrievalDocument>> {
		let searcher = self.reader.searcher();
		let total = searcher.num_docs() as usize;
		if total == 0 {
			return Ok(Vec::new());
		}
		let top = searcher.search(&AllQuery, &TopDocs::with_limit(total)).map_err(index_err)?;
		let mut documents = Vec::with_capacity(top.len());
		for (_, addr) in top {
			let doc: TantivyDocument = searcher.doc(addr).map_err(index_err)?;
			documents.push(self.to_document(&doc));
		}
		Ok(documents)
	}

	fn delete_by_id(&self, id: &str) -> Result<()> {
		self.write(|w| {
			w.delete_term(Term::from_field_text(self.id_field, id));
			Ok(())
		})
	}

	fn delete_all(&self) -> Result<()> {
		self.write(|w| w.delete_all_documents().map(|_| ()))
	}

	fn count(&self) -> Result<u64> {
		Ok(self.reader.searcher().num_docs())
	}

	fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
		if query.trim().is_empty() || limit == 0 {
			return Ok(Vec::new());
		}
		let searcher = self.reader.searcher();
		let parser = QueryParser::for_index(&self.index, vec![self.name_field, self.text_field]);
		let (parsed, errors) = parser.parse_query_lenient(query);
		if !errors.is_empty() {
			debug!("Lenient parse of '{}' dropped {} fragments", query, errors.len());
		}
		let top = searcher.search(&parsed, &TopDocs::with_limit(limit)).map_err(index_err)?;
		let mut hits = Vec::with_capacity(top.len());
		for (score, addr) in top {
			let doc: TantivyDocument = searcher.doc(addr).map_err(index_err)?;
			hits.push(SearchHit { document: self.to_document(&doc), score });
		}
		Ok(hits)
	}
}
