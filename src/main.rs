use edgeload::error::AppResult;

fn main() -> AppResult<()> {
    edgeload::entry::run()
}
