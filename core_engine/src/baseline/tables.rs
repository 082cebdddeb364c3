//! Built-in word lists. Earlier entries in `COMMON_WORDS` rank higher.

pub const COMMON_WORDS: &[&str] = &[
    "the", "and", "that", "have", "for", "not", "with", "you", "this", "but", "his", "from",
    "they", "she", "her", "been", "than", "its", "who", "oil", "use", "may", "water", "very",
    "what", "know", "just", "first", "get", "over", "think", "also", "your", "work", "life",
    "only", "can", "still", "should", "after", "being", "now", "made", "before", "here", "through",
    "when", "where", "much", "back", "time", "good", "way", "well", "new", "want", "because",
    "any", "these", "give", "day", "most", "us", "world", "year", "come", "could", "see", "him",
    "two", "how", "our", "out", "up", "other", "many", "then", "them", "would", "like", "into",
    "long", "make", "thing", "look", "more", "go", "do", "take", "people", "hand", "place",
    "house", "great", "right", "small", "large", "help", "hello", "happy", "hope", "home", "heart",
    "head", "health", "beautiful", "better", "best", "between", "big", "black", "blue", "book",
    "call", "car", "care", "carry", "case", "change", "child", "clear", "close", "color",
    "company", "country", "course", "create", "different", "develop", "door", "down", "during",
    "each", "early", "easy", "economic", "education", "end", "environment", "even", "every",
    "example", "experience", "fact", "family", "far", "feel", "few", "find", "follow", "food",
    "form", "friend", "full", "game", "general", "government", "group", "grow", "happen", "hard",
    "hear", "high", "history", "hold", "hour", "however", "human", "idea", "important", "include",
    "increase", "indeed", "information", "inside", "instead", "interest", "international", "issue",
    "job", "keep", "kind", "language", "last", "late", "learn", "least", "leave", "left", "legal",
    "less", "level", "light", "line", "list", "little", "live", "local", "love", "low", "machine",
    "major", "management", "manager", "market", "material", "matter", "mean", "measure", "media",
    "medical", "meet", "member", "mention", "method", "middle", "might", "military", "million",
    "mind", "minute", "miss", "model", "modern", "moment", "money", "month", "morning", "mother",
    "move", "movement", "music", "must", "name", "nation", "national", "natural", "nature", "near",
    "necessary", "need", "network", "never", "news", "newspaper", "next", "nice", "night",
    "nothing", "notice", "number", "occur", "often", "once", "open", "operation", "opportunity",
    "option", "order", "organization", "others", "outside", "own", "page", "paper", "parent",
    "part", "particular", "party", "pass", "past", "pattern", "pay", "peace", "perform",
    "performance", "perhaps", "period", "person", "personal", "phone", "physical", "pick",
    "picture", "piece", "plan", "plant", "play", "player", "point", "policy", "political",
    "politics", "poor", "popular", "population", "position", "positive", "possible", "power",
    "practice", "prepare", "present", "president", "pressure", "pretty", "prevent", "price",
    "private", "probably", "problem", "process", "produce", "product", "production",
    "professional", "program", "project", "property", "protect", "provide", "public", "purpose",
    "put", "quality", "question", "quickly", "quite", "race", "radio", "raise", "range", "rate",
    "rather", "reach", "read", "ready", "real", "reality", "realize", "really", "reason",
    "receive", "recent", "recognize", "record", "red", "reduce", "reflect", "region", "relate",
    "relationship", "religious", "remain", "remember", "remove", "report", "represent", "require",
    "research", "resource", "respond", "response", "responsibility", "rest", "result", "return",
    "reveal", "rich", "rise", "risk", "road", "rock", "role", "room", "rule", "run", "safe",
    "same", "save", "say", "scene", "school", "science", "scientist", "score", "sea", "season",
    "seat", "second", "section", "security", "seek", "seem", "sell", "send", "senior", "sense",
    "series", "serious", "serve", "service", "set", "seven", "several", "sex", "sexual", "shake",
    "share", "shoot", "short", "shot", "shoulder", "show", "side", "significant", "similar",
    "simple", "simply", "since", "sing", "single", "sister", "sit", "site", "situation", "six",
    "size", "skill", "skin", "smile", "so", "social", "society", "soldier", "some", "somebody",
    "someone", "something", "sometimes", "son", "song", "soon", "sort", "sound", "source", "south",
    "southern", "space", "speak", "special", "specific", "speech", "spend", "sport", "spring",
    "staff", "stage", "stand", "standard", "star", "start", "state", "statement", "station",
    "stay", "step", "stock", "stop", "store", "story", "strategy", "street", "strong", "structure",
    "student", "study", "stuff", "style", "subject", "success", "successful", "such", "suddenly",
    "suffer", "suggest", "summer", "support", "sure", "surface", "system", "table", "talk", "task",
    "tax", "teach", "teacher", "team", "technology", "television", "tell", "ten", "tend", "term",
    "test", "thank", "their", "themselves", "theory", "there", "third", "those", "though",
    "thought", "thousand", "threat", "three", "throughout", "throw", "thus", "today", "together",
    "tonight", "too", "top", "total", "tough", "toward", "town", "trade", "traditional",
    "training", "travel", "treat", "treatment", "tree", "trial", "trip", "trouble", "true",
    "truth", "try", "turn", "twelve", "twenty", "type", "under", "understand", "unit", "until",
    "upon", "used", "user", "usually", "value", "various", "victim", "view", "violence", "visit",
    "voice", "wait", "walk", "wall", "war", "watch", "weapon", "wear", "week", "weight", "west",
    "western", "whatever", "whether", "which", "while", "white", "whole", "whom", "whose", "why",
    "wide", "wife", "will", "win", "wind", "window", "wish", "within", "without", "woman",
    "wonder", "word", "worker", "worry", "write", "writer", "wrong", "yard", "yeah", "yes", "yet",
    "young", "yourself",
];

/// Opening words offered when nothing has been typed yet.
pub const STARTER_WORDS: &[&str] = &["the", "i", "you", "it", "we", "they", "this", "that"];

/// Offered when the last word has no entry in `NEXT_WORDS`.
pub const DEFAULT_NEXT_WORDS: &[&str] = &["and", "the", "to", "of", "in", "for", "with", "on"];

pub const NEXT_WORDS: &[(&str, &[&str])] = &[
    ("the", &["cat", "dog", "house", "car", "book", "world", "time", "way"]),
    ("i", &["am", "was", "will", "have", "think", "want", "like", "need"]),
    ("you", &["are", "were", "will", "have", "can", "should", "want", "need"]),
    ("is", &["a", "an", "the", "not", "very", "quite", "really", "being"]),
    ("are", &["not", "you", "we", "they", "being", "going", "coming", "here"]),
    ("and", &["the", "i", "you", "we", "they", "it", "then", "now"]),
    ("to", &["be", "do", "go", "see", "get", "make", "take", "have"]),
    ("in", &["the", "a", "an", "this", "that", "order", "time", "fact"]),
    ("on", &["the", "a", "top", "time", "fire", "purpose", "earth", "board"]),
    ("at", &["the", "a", "least", "last", "first", "home", "work", "school"]),
    ("will", &["be", "have", "go", "come", "take", "make", "get", "see"]),
    ("can", &["be", "do", "go", "see", "get", "make", "take", "help"]),
    ("this", &["is", "was", "will", "can", "could", "should", "would", "might"]),
    ("that", &["is", "was", "will", "can", "could", "should", "would", "might"]),
    ("have", &["a", "an", "the", "been", "to", "not", "you", "they"]),
    ("with", &["a", "an", "the", "you", "me", "him", "her", "them"]),
    ("for", &["a", "an", "the", "you", "me", "him", "her", "them"]),
    ("it", &["is", "was", "will", "can", "could", "should", "would", "might"]),
    ("was", &["a", "an", "the", "not", "very", "quite", "really", "being"]),
    ("were", &["not", "you", "we", "they", "being", "going", "coming", "here"]),
];
