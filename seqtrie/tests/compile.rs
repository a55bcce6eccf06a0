use seqtrie::{
    compile::{
        Completion, CompletionPool, DecodedMatch, EncodeError, ResolveError, Resolver,
        TableReader, Trie, TrieEncoder, TrieError,
    },
    import::{parse_rules, Rule},
    Alphabet, CompileError, Compiler, Config, SequenceTransformData,
};

const CONFIG: &str = r#"{
    "magic_chars": "@",
    "output_func_chars": "%",
    "wordbreak_char": ":",
    "comment_str": "//",
    "separator_str": "->",
    "rules_file_name": "sequence_transform_dict.txt"
}"#;

const DICTIONARY: &str = "
// Magic key completions
:ex@ -> example
:ob@ -> obvious
:d@ -> develop
:d@r -> developer
:d@m -> development
:i@ -> I:am

// Typos
teh@ -> the
:thx -> thanks
q@ -> quit%
";

fn config() -> Config {
    Config::from_json(CONFIG).unwrap()
}

fn alphabet() -> Alphabet {
    config().alphabet().unwrap()
}

fn compile(source: &str) -> Result<SequenceTransformData, CompileError> {
    let _ = env_logger::builder().is_test(true).try_init();
    seqtrie::compile(source, &config())
}

fn decode(data: &SequenceTransformData) -> Vec<DecodedMatch> {
    TableReader::new(&data.trie, &data.completions, &alphabet())
        .decode()
        .unwrap()
}

fn lookup(data: &SequenceTransformData, context: &str) -> DecodedMatch {
    decode(data)
        .into_iter()
        .find(|m| m.context == context)
        .unwrap_or_else(|| panic!("{:?} not found in table", context))
}

fn decoded(context: &str, backspaces: u8, output_func: u8, output: &str) -> DecodedMatch {
    DecodedMatch {
        context: context.into(),
        backspaces,
        output_func,
        output: output.into(),
    }
}

#[test]
fn encode_shared_prefix_branch() {
    let data = compile("ex@ -> example\nob@ -> obvious").unwrap();

    assert_eq!(
        data.trie,
        vec![
            0x0100, 0x0000, // chain '@'
            0x4005, 0x0007, 0x001B, 0x000B, 0x0000, // branch 'b', 'x'
            0x0012, 0x0000, // chain 'o'
            0x8005, 0x0005, // "vious"
            0x0008, 0x0000, // chain 'e'
            0x8005, 0x0000, // "ample"
        ]
    );
    assert_eq!(data.completions, b"amplevious");

    assert_eq!(data.dictionary_size(), 15);
    assert_eq!(data.completions_size(), 10);
    assert_eq!(data.max_completion_len, 5);
    assert_eq!(data.max_backspaces, 0);
    assert_eq!(data.min_sequence, "ex@");
    assert_eq!(data.max_sequence, "ex@");
    assert_eq!(data.magic_count, 1);
}

#[test]
fn encode_match_with_children() {
    let data = compile("a -> xy\nab -> xyz").unwrap();

    assert_eq!(
        data.trie,
        vec![
            0x4004, 0x0005, 0x0005, 0x0007, 0x0000, // branch 'a', 'b'
            0x8002, 0x0000, // "xy"
            0x0004, 0x0000, // chain 'a'
            0x8001, 0x0002, // "z"
        ]
    );
    assert_eq!(data.completions, b"xyz");
}

#[test]
fn flag_match_entries_which_continue() {
    let data = compile("b -> x\nab -> y").unwrap();

    // Match entry of 'b' is followed by the chain towards "ab"
    assert_eq!(&data.trie[..4], &[0x0005u16, 0x0000, 0xC001, 0x0000]);
    assert_eq!(
        decode(&data),
        vec![decoded("b", 0, 0, "x"), decoded("ab", 1, 0, "y")]
    );
}

#[test]
fn compute_backspaces_from_common_prefix() {
    let data = compile("teh@ -> the").unwrap();
    assert_eq!(lookup(&data, "teh@"), decoded("teh@", 2, 0, "he"));
    assert_eq!(data.max_backspaces, 2);
}

#[test]
fn account_for_shorter_rules_firing_first() {
    let data = compile("a -> xy\nab -> xyz").unwrap();

    assert_eq!(lookup(&data, "a"), decoded("a", 0, 0, "xy"));
    assert_eq!(lookup(&data, "ab"), decoded("ab", 0, 0, "z"));
}

#[test]
fn chain_completions_of_magic_sequences() {
    let data = compile(":d@ -> develop\n:d@r -> developer").unwrap();

    assert_eq!(lookup(&data, ":d@"), decoded(":d@", 0, 0, "evelop"));
    assert_eq!(lookup(&data, ":d@r"), decoded(":d@r", 0, 0, "er"));
}

#[test]
fn prefer_simulated_buffer_over_typed_keys() {
    let data = compile("a -> b\nba -> c\naaq -> zzz").unwrap();

    // "aa" shows up as "c" on screen, not as "aa"
    assert_eq!(lookup(&data, "aaq"), decoded("aaq", 1, 0, "zzz"));
}

#[test]
fn render_word_breaks_in_output_as_spaces() {
    let data = compile(":i@ -> I:am").unwrap();

    assert_eq!(lookup(&data, ":i@"), decoded(":i@", 1, 0, "I am"));
    assert_eq!(data.completions, b"I am");
}

#[test]
fn store_output_function() {
    let data = compile("q@ -> quit%").unwrap();

    assert_eq!(data.trie, vec![0x0100, 0x0014, 0x0000, 0x8803, 0x0000]);
    assert_eq!(lookup(&data, "q@"), decoded("q@", 0, 1, "uit"));
}

#[test]
fn support_maximum_backspaces() {
    let data = compile("abcdefghijklmno@ -> z").unwrap();
    assert_eq!(data.max_backspaces, 15);

    let result = compile("abcdefghijklmnop@ -> z");
    assert!(matches!(
        result,
        Err(CompileError::Resolve(ResolveError::TooManyBackspaces {
            backspaces: 16,
            max: 15,
            ..
        }))
    ));
}

#[test]
fn support_maximum_output_length() {
    let longest = format!("q@ -> q{}", "a".repeat(127));
    let data = compile(&longest).unwrap();
    assert_eq!(data.max_completion_len, 127);

    let too_long = format!("q@ -> {}", "a".repeat(128));
    assert_eq!(
        compile(&too_long).unwrap_err().to_string(),
        "sequence \"q@\" outputs 128 characters, at most 127 are supported"
    );
}

#[test]
fn detect_self_referencing_resolution() {
    // Typing "wq" after "w" turned into "wq" ends in "wqq" again
    let result = compile("w -> wq\nwqq -> z");

    assert!(matches!(
        result,
        Err(CompileError::Resolve(ResolveError::Cycle { context })) if context == "wqq"
    ));
}

#[test]
fn reject_unknown_trigger_character() {
    assert!(matches!(
        compile("ab€ -> x"),
        Err(CompileError::Trie(TrieError::UnknownCharacter { character: '€', .. }))
    ));
}

#[test]
fn reject_duplicate_contexts_handed_in_directly() {
    let alphabet = alphabet();
    let rule = |line, correction: &str| Rule {
        line,
        context: "a@".into(),
        correction: correction.into(),
    };

    let result = Compiler::new(&alphabet).compile(vec![rule(1, "x"), rule(2, "y")]);

    assert!(matches!(
        result,
        Err(CompileError::Trie(TrieError::DuplicateContext { context })) if context == "a@"
    ));
}

#[test]
fn reject_tables_beyond_16_bit_offsets() {
    let letters = 'a'..='z';
    let source: String = letters
        .clone()
        .flat_map(|a| letters.clone().map(move |b| (a, b)))
        .flat_map(|(a, b)| letters.clone().map(move |c| format!("{}{}{}@ -> x\n", a, b, c)))
        .collect();

    assert!(matches!(
        compile(&source),
        Err(CompileError::Encode(EncodeError::TableOverflow { offset })) if offset > 0xFFFF
    ));
}

#[test]
fn reject_empty_dictionary() {
    assert!(matches!(
        compile("// nothing to see here\n\n"),
        Err(CompileError::EmptyDictionary)
    ));
}

#[test]
fn report_ingest_errors() {
    assert!(matches!(
        compile("a@ -> x\nbroken line"),
        Err(CompileError::Ingest(_))
    ));
}

#[test]
fn reject_non_ascii_output() {
    assert!(matches!(
        compile("e@ -> é"),
        Err(CompileError::Pool(_))
    ));
}

#[test]
fn pick_first_of_equally_long_sequences() {
    let data = compile("ab@ -> x\ncd@ -> y\nlong@ -> z\nwide@ -> w").unwrap();

    assert_eq!(data.min_sequence, "ab@");
    assert_eq!(data.max_sequence, "long@");
}

#[test]
fn read_back_every_rule() {
    let data = compile(DICTIONARY).unwrap();
    let alphabet = alphabet();

    let rules = parse_rules(DICTIONARY, &alphabet, "->", "//").unwrap();
    let trie = Trie::build(&rules, &alphabet).unwrap();
    let completions = Resolver::new(&trie, &alphabet).resolve_all().unwrap();

    let mut expected: Vec<DecodedMatch> = trie
        .matches()
        .map(|(id, rule)| {
            let completion = &completions[id.index()];
            decoded(
                &rule.context,
                completion.backspaces,
                completion.output_func,
                &completion.output,
            )
        })
        .collect();
    expected.sort();

    let mut found = decode(&data);
    found.sort();

    assert_eq!(found.len(), 9);
    assert_eq!(found, expected);
}

#[test]
fn resolve_consistently() {
    let alphabet = alphabet();
    let rules = parse_rules(DICTIONARY, &alphabet, "->", "//").unwrap();
    let trie = Trie::build(&rules, &alphabet).unwrap();

    let mut resolver = Resolver::new(&trie, &alphabet);
    let ids: Vec<_> = trie.matches().map(|(id, _)| id).collect();

    let forward: Vec<Completion> = ids.iter().map(|id| resolver.resolve(*id).unwrap()).collect();
    let again: Vec<Completion> = ids.iter().map(|id| resolver.resolve(*id).unwrap()).collect();
    assert_eq!(forward, again);

    // Order of resolution does not matter
    let mut fresh = Resolver::new(&trie, &alphabet);
    let mut backward: Vec<Completion> = ids
        .iter()
        .rev()
        .map(|id| fresh.resolve(*id).unwrap())
        .collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn compile_deterministically() {
    let first = compile(DICTIONARY).unwrap();
    let second = compile(DICTIONARY).unwrap();

    assert_eq!(first, second);
}

#[test]
fn encode_from_parts() {
    let alphabet = alphabet();
    let rules = parse_rules("teh@ -> the", &alphabet, "->", "//").unwrap();
    let trie = Trie::build(&rules, &alphabet).unwrap();
    let completions = Resolver::new(&trie, &alphabet).resolve_all().unwrap();
    let pool = CompletionPool::new(completions.iter().map(|c| c.output.as_str())).unwrap();

    let table = TrieEncoder::new(&trie, &completions, &pool).encode().unwrap();

    // '@', 'h', 'e', 't' followed by the match
    assert_eq!(
        table,
        vec![0x0100, 0x000B, 0x0008, 0x0017, 0x0000, 0x8102, 0x0000]
    );
}
