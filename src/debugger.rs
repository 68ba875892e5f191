use ext2scope::filesystem::Filesystem;
use ext2scope::filetypes::BlockPointers;
use ext2scope::structs::DirectoryEntries;

fn prompt(separator: &str) -> Option<Vec<String>> {
    use std::io::Write;
    let mut line = String::new();
    print!("{separator}");
    std::io::stdout().flush().ok()?;
    match std::io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.split_whitespace().map(str::to_string).collect()),
    }
}

fn argument(cmd: &[String]) -> Result<u32, Box<dyn std::error::Error>> {
    match cmd.get(1) {
        Some(arg) => Ok(arg.parse()?),
        None => Err(format!("usage: {} <number>", cmd[0]).into()),
    }
}

fn execute(fs: &mut Filesystem, cmd: &[String]) -> Result<bool, Box<dyn std::error::Error>> {
    if cmd.is_empty() {
        return Ok(true);
    }
    match cmd[0].as_str() {
        "s" => println!["{}", fs.superblock()],
        "g" => {
            if cmd.len() == 2 {
                let group = argument(cmd)? as usize;
                let descriptor = fs
                    .groups()
                    .get(group)
                    .ok_or_else(|| format!("group {group} does not exist"))?;
                println!["{descriptor}"];
            } else {
                for (index, descriptor) in fs.groups().iter().enumerate() {
                    println!["group {index}"];
                    println!["{descriptor}"];
                }
            }
        }
        "i" => println!["{}", fs.load_inode(argument(cmd)?)?],
        "b" => {
            let block = fs.load_block(argument(cmd)?)?;
            if block.is_empty() {
                println!["block {} is zero-filled", block.index];
            } else {
                print!["{block}"];
            }
        }
        "l" => {
            let inode = fs.load_inode(argument(cmd)?)?;
            println!["{} pointers per indirect block", fs.superblock().pointers_per_block()];
            for (position, block) in BlockPointers::new(&inode).iter(fs).enumerate() {
                match block {
                    Ok(block) => println!["{position:>8}  {block}"],
                    Err(e) => eprintln!["{position:>8}  {e}"],
                }
            }
        }
        "d" => {
            let inode = fs.load_inode(argument(cmd)?)?;
            if !inode.is_directory() {
                return Err(format!("inode {} is not a directory", inode.index).into());
            }
            let has_file_type = fs.superblock().has_file_type();
            let blocks: Vec<_> = BlockPointers::new(&inode).iter(fs).collect();
            for block in blocks {
                let block = fs.load_block(block?)?;
                println!["block {}", block.index];
                for entry in DirectoryEntries::new(&block.data, has_file_type) {
                    let entry = entry?;
                    println![
                        "{:>8}  {:>5}  {:<12} {}",
                        entry.inode,
                        entry.rec_len,
                        entry.file_type,
                        entry.name()
                    ];
                }
            }
        }
        "q" => return Ok(false),
        other => eprintln!["unknown command {other:?}, expected one of s g i b l d q"],
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let image = args.first().ok_or("usage: debugger <IMAGE>")?;
    let dev = std::fs::File::open(image)?;
    let mut fs = Filesystem::load(Box::new(dev))?;
    while let Some(cmd) = prompt(">> ") {
        match execute(&mut fs, &cmd) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}
