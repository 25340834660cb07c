/// Placeholder meaning "any" in `reset` arguments
pub const WILDCARD: &str = "*";

pub const HELP: &str = "\
status <provider> <user>               bucket status of one user
all <user>                             bucket status for every provider
next <provider> <user>                 milliseconds until the next token
acquire <provider> <user> [timeout_ms] wait for a token
try <provider> <user>                  take a token without waiting
reset [provider|*] [user|*]            clear bucket state
providers                              configured quota profiles
metrics                                limiter counters
help                                   this text
quit                                   leave the console";
