pub mod core;
pub mod codec;
pub mod analysis;
pub mod corpus;
pub mod storage;
pub mod index;
pub mod query;
pub mod verify;

/*
┌──────────────────────────────── INVIDX PIPELINE ─────────────────────────────────┐
│                                                                                   │
│  corpus/part_*.tsv ──> CorpusReader ──> IndexBuilder ──┬──> vocab.tsv             │
│                            │                │          ├──> postings.bin          │
│                            │                │          ├──> forward.tsv           │
│                      Tokenizer +       PostingsCodec   ├──> doclens.json          │
│                      TermTransform     (varint + gaps) └──> meta.json             │
│                            │                                                      │
│                            │           IndexReader <────── on-disk artifacts      │
│                            │                │                                     │
│                            │           Searcher: tokenize ──> postfix ──> eval    │
│                            │                │                (RoaringBitmap)      │
│                            └──> Verifier ───┴──> VerifyReport                     │
│                                                                                   │
└───────────────────────────────────────────────────────────────────────────────────┘
*/
